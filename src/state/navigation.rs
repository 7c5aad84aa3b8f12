// Navigation state management.
// Handles the drill-down stack and breadcrumb trail of the Accounts tab.

/// A node in the navigation breadcrumb trail.
#[derive(Debug, Clone)]
pub struct BreadcrumbNode {
    pub label: String,
    pub level: ViewLevel,
}

/// The current view level in the accounts hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewLevel {
    /// Top level: all registered accounts
    Accounts,
    /// Detail page for one account
    Account { account_id: u64, label: String },
    /// API tokens derived from one account
    Tokens { account_id: u64, label: String },
}

impl ViewLevel {
    pub fn title(&self) -> String {
        match self {
            ViewLevel::Accounts => "Accounts".to_string(),
            ViewLevel::Account { label, .. } => format!("{} / Details", label),
            ViewLevel::Tokens { label, .. } => format!("{} / Tokens", label),
        }
    }

    /// Account the view is scoped to, if any.
    pub fn account_id(&self) -> Option<u64> {
        match self {
            ViewLevel::Accounts => None,
            ViewLevel::Account { account_id, .. } | ViewLevel::Tokens { account_id, .. } => {
                Some(*account_id)
            }
        }
    }

    pub fn to_breadcrumb(&self) -> BreadcrumbNode {
        let label = match self {
            ViewLevel::Accounts => "Accounts".to_string(),
            ViewLevel::Account { label, .. } => label.clone(),
            ViewLevel::Tokens { .. } => "Tokens".to_string(),
        };
        BreadcrumbNode {
            label,
            level: self.clone(),
        }
    }
}

/// Navigation stack for a tab. Never empty: the root cannot be popped.
#[derive(Debug, Clone)]
pub struct NavigationStack {
    root: ViewLevel,
    stack: Vec<ViewLevel>,
}

impl NavigationStack {
    pub fn new(root: ViewLevel) -> Self {
        Self {
            root,
            stack: Vec::new(),
        }
    }

    pub fn current(&self) -> &ViewLevel {
        self.stack.last().unwrap_or(&self.root)
    }

    /// Drill down.
    pub fn push(&mut self, level: ViewLevel) {
        self.stack.push(level);
    }

    /// Go back. Returns false at the root.
    pub fn pop(&mut self) -> bool {
        self.stack.pop().is_some()
    }

    pub fn can_go_back(&self) -> bool {
        !self.stack.is_empty()
    }

    pub fn breadcrumbs(&self) -> Vec<BreadcrumbNode> {
        std::iter::once(&self.root)
            .chain(self.stack.iter())
            .map(ViewLevel::to_breadcrumb)
            .collect()
    }

    pub fn reset(&mut self) {
        self.stack.clear();
    }

    pub fn depth(&self) -> usize {
        self.stack.len() + 1
    }
}

impl Default for NavigationStack {
    fn default() -> Self {
        Self::new(ViewLevel::Accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: u64) -> ViewLevel {
        ViewLevel::Account {
            account_id: id,
            label: "alice".to_string(),
        }
    }

    #[test]
    fn test_navigation_stack() {
        let mut nav = NavigationStack::default();
        assert_eq!(nav.depth(), 1);
        assert!(!nav.can_go_back());
        assert_eq!(nav.current().account_id(), None);

        nav.push(account(7));
        nav.push(ViewLevel::Tokens {
            account_id: 7,
            label: "alice".to_string(),
        });
        assert_eq!(nav.depth(), 3);
        assert_eq!(nav.current().account_id(), Some(7));
        assert_eq!(nav.current().title(), "alice / Tokens");

        assert!(nav.pop());
        assert!(nav.pop());
        assert!(!nav.pop());
        assert_eq!(nav.current(), &ViewLevel::Accounts);
    }

    #[test]
    fn test_breadcrumbs() {
        let mut nav = NavigationStack::default();
        nav.push(account(7));
        nav.push(ViewLevel::Tokens {
            account_id: 7,
            label: "alice".to_string(),
        });

        let labels: Vec<String> = nav.breadcrumbs().into_iter().map(|b| b.label).collect();
        assert_eq!(labels, vec!["Accounts", "alice", "Tokens"]);

        nav.reset();
        assert_eq!(nav.breadcrumbs().len(), 1);
    }
}
