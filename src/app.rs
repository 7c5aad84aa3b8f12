// App state and main event loop.
// Manages tabs, modal input and keyboard handling; runs actions against the stores.

use std::io;

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::prelude::*;

use crate::api::types::ChannelType;
use crate::auth::Session;
use crate::clipboard;
use crate::config::ConsoleConfig;
use crate::error::{ConsoleError, Result};
use crate::format::full_token_key;
use crate::state::{
    AccountDetailStore, AccountStore, AuditStore, Confirm, ConfirmAction, Console, DashboardStore,
    Form, FormKind, NavigationStack, NotifyStore, SettingsStore, SignLogStore, StatisticsStore,
    ViewLevel,
};
use crate::storage::paths;
use crate::theme::{self, Palette, ThemeMode};
use crate::ui;

/// Active tab in the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Dashboard,
    Accounts,
    SignLogs,
    Notify,
    Statistics,
    Settings,
    Audit,
    Console,
}

impl Tab {
    pub const ALL: [Tab; 8] = [
        Tab::Dashboard,
        Tab::Accounts,
        Tab::SignLogs,
        Tab::Notify,
        Tab::Statistics,
        Tab::Settings,
        Tab::Audit,
        Tab::Console,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Accounts => "Accounts",
            Tab::SignLogs => "Sign Logs",
            Tab::Notify => "Notify",
            Tab::Statistics => "Statistics",
            Tab::Settings => "Settings",
            Tab::Audit => "Audit",
            Tab::Console => "Console",
        }
    }

    fn index(&self) -> usize {
        Tab::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Main,
}

/// Work triggered by a key press. Anything that talks to the server goes through here.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Login,
    SubmitForm,
    Confirm,
    SwitchTab(Tab),
    Refresh,
    Open,
    NextPage,
    PrevPage,
    SignSelected,
    HealthCheckSelected,
    HealthCheckAll,
    ShowTokens,
    SyncTokens,
    CopyToken,
    ToggleActive,
    MoveToNextGroup,
    ToggleChannel,
    SyncEndpoints,
    CycleSuccessFilter,
    CycleAccountFilter,
    CycleDays,
    ToggleSetting,
    ExportBackup { include_logs: bool },
    CycleAuditAction,
    ToggleTheme,
}

/// Main application state.
pub struct App {
    pub session: Session,
    pub config: ConsoleConfig,
    pub screen: Screen,
    pub active_tab: Tab,
    pub console: Console,
    pub dashboard: DashboardStore,
    pub accounts: AccountStore,
    pub nav: NavigationStack,
    pub detail: AccountDetailStore,
    pub sign_logs: SignLogStore,
    pub notify: NotifyStore,
    pub statistics: StatisticsStore,
    pub settings: SettingsStore,
    pub audit: AuditStore,
    pub login_form: Form,
    pub login_error: Option<String>,
    pub form: Option<Form>,
    pub form_error: Option<String>,
    pub confirm: Option<Confirm>,
    pub show_help: bool,
    pub theme_mode: ThemeMode,
    pub system_dark: bool,
    /// Set while an action is waiting on the server.
    pub busy: bool,
    pub should_quit: bool,
    pending_copy: Option<String>,
}

impl App {
    pub fn new(session: Session, config: ConsoleConfig) -> Self {
        let screen = if session.is_logged_in() {
            Screen::Main
        } else {
            Screen::Login
        };
        let theme_mode = theme::stored_mode(session.preferences());
        let snapshot = paths::dashboard_snapshot_path(&config.data_dir);

        Self {
            session,
            config,
            screen,
            active_tab: Tab::default(),
            console: Console::new(),
            dashboard: DashboardStore::with_snapshot(snapshot),
            accounts: AccountStore::new(),
            nav: NavigationStack::default(),
            detail: AccountDetailStore::new(),
            sign_logs: SignLogStore::new(),
            notify: NotifyStore::new(),
            statistics: StatisticsStore::new(),
            settings: SettingsStore::new(),
            audit: AuditStore::new(),
            login_form: Form::login(),
            login_error: None,
            form: None,
            form_error: None,
            confirm: None,
            show_help: false,
            theme_mode,
            system_dark: theme::system_prefers_dark(),
            busy: false,
            should_quit: false,
            pending_copy: None,
        }
    }

    pub fn palette(&self) -> Palette {
        Palette::for_theme(theme::active_theme(self.theme_mode, self.system_dark))
    }

    /// Main event loop.
    pub async fn run(&mut self, terminal: &mut Terminal<impl Backend>) -> io::Result<()> {
        if self.screen == Screen::Main {
            self.dashboard.load_snapshot();
            terminal.draw(|frame| ui::draw(frame, self))?;
            self.dispatch(Action::Refresh).await;
        }

        while !self.should_quit {
            terminal.draw(|frame| ui::draw(frame, self))?;
            if let Some(action) = self.poll_action()? {
                self.busy = true;
                terminal.draw(|frame| ui::draw(frame, self))?;
                self.dispatch(action).await;
                self.busy = false;
            }
            if let Some(text) = self.pending_copy.take() {
                clipboard::copy_to_clipboard(&mut io::stdout(), &text)
                    .unwrap_or_else(|err| self.console.report(&err));
            }
        }
        Ok(())
    }

    #[allow(clippy::collapsible_if)]
    fn poll_action(&mut self) -> io::Result<Option<Action>> {
        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(self.handle_key(key));
                }
            }
        }
        Ok(None)
    }

    /// Apply a key press to local state. Returns an action when server work is needed.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return None;
        }
        if self.screen == Screen::Login {
            return self.handle_login_key(key);
        }
        if self.confirm.is_some() {
            return self.handle_confirm_key(key);
        }
        if self.form.is_some() {
            return self.handle_form_key(key);
        }
        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return None;
        }
        self.handle_main_key(key)
    }

    fn handle_login_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter if self.login_form.is_last_field() => return Some(Action::Login),
            KeyCode::Enter | KeyCode::Tab | KeyCode::Down => self.login_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.login_form.prev_field(),
            KeyCode::Backspace => self.login_form.backspace(),
            KeyCode::Char(c) => self.login_form.input(c),
            _ => {}
        }
        None
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Some(Action::Confirm),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirm = None;
                None
            }
            _ => None,
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Option<Action> {
        let form = self.form.as_mut()?;
        match key.code {
            KeyCode::Esc => {
                self.form = None;
                self.form_error = None;
            }
            KeyCode::Enter if form.is_last_field() => return Some(Action::SubmitForm),
            KeyCode::Enter | KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(c) => form.input(c),
            _ => {}
        }
        None
    }

    fn open_form(&mut self, form: Form) {
        self.form_error = None;
        self.form = Some(form);
    }

    fn handle_main_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return None;
            }
            KeyCode::Tab => return Some(Action::SwitchTab(self.active_tab.next())),
            KeyCode::BackTab => return Some(Action::SwitchTab(self.active_tab.prev())),
            KeyCode::Char('?') => {
                self.show_help = true;
                return None;
            }
            KeyCode::Char('T') => return Some(Action::ToggleTheme),
            KeyCode::Char('r') => return Some(Action::Refresh),
            _ => {}
        }

        match self.active_tab {
            Tab::Dashboard => self.dashboard_key(key),
            Tab::Accounts => self.accounts_key(key),
            Tab::SignLogs => self.sign_logs_key(key),
            Tab::Notify => self.notify_key(key),
            Tab::Statistics => match key.code {
                KeyCode::Char('d') => Some(Action::CycleDays),
                KeyCode::Up | KeyCode::Char('k') => {
                    self.statistics.accounts.select_prev();
                    None
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.statistics.accounts.select_next();
                    None
                }
                _ => None,
            },
            Tab::Settings => self.settings_key(key),
            Tab::Audit => self.audit_key(key),
            Tab::Console => {
                match key.code {
                    KeyCode::Up | KeyCode::Char('k') => self.console.select_prev(),
                    KeyCode::Down | KeyCode::Char('j') => self.console.select_next(),
                    KeyCode::Char('c') => self.console.clear(),
                    _ => {}
                }
                None
            }
        }
    }

    fn dashboard_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.dashboard.endpoints.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.dashboard.endpoints.select_next(),
            KeyCode::Char('s') => return Some(Action::SyncEndpoints),
            KeyCode::Char('S') => self.confirm_sign_all(),
            KeyCode::Char('H') => return Some(Action::HealthCheckAll),
            _ => {}
        }
        None
    }

    fn confirm_sign_all(&mut self) {
        self.confirm = Some(Confirm::new(
            ConfirmAction::SignAll,
            "Sign in every active account now?",
        ));
    }

    fn accounts_key(&mut self, key: KeyEvent) -> Option<Action> {
        if matches!(key.code, KeyCode::Esc | KeyCode::Backspace) {
            self.nav.pop();
            return None;
        }

        match self.nav.current().clone() {
            ViewLevel::Accounts => match key.code {
                KeyCode::Up | KeyCode::Char('k') => self.accounts.select_prev(),
                KeyCode::Down | KeyCode::Char('j') => self.accounts.select_next(),
                KeyCode::Enter => return Some(Action::Open),
                KeyCode::Char('s') => return Some(Action::SignSelected),
                KeyCode::Char('h') => return Some(Action::HealthCheckSelected),
                KeyCode::Char('S') => self.confirm_sign_all(),
                KeyCode::Char('H') => return Some(Action::HealthCheckAll),
                KeyCode::Char('g') => self.accounts.cycle_group_filter(),
                KeyCode::Char('G') => return Some(Action::MoveToNextGroup),
                KeyCode::Char('x') => return Some(Action::ToggleActive),
                KeyCode::Char('t') => return Some(Action::ShowTokens),
                KeyCode::Char('a') => self.open_form(Form::add_account()),
                KeyCode::Char('d') => {
                    if let Some(account) = self.accounts.selected_account() {
                        self.confirm = Some(Confirm::new(
                            ConfirmAction::DeleteAccount(account.id),
                            format!("Delete account {}?", account.label()),
                        ));
                    }
                }
                _ => {}
            },
            ViewLevel::Account { .. } => match key.code {
                KeyCode::Up | KeyCode::Char('k') => self.detail.select_prev_channel(),
                KeyCode::Down | KeyCode::Char('j') => self.detail.select_next_channel(),
                KeyCode::Enter | KeyCode::Char(' ') => return Some(Action::ToggleChannel),
                KeyCode::Char('s') => return Some(Action::SignSelected),
                KeyCode::Char('h') => return Some(Action::HealthCheckSelected),
                KeyCode::Char('t') => return Some(Action::ShowTokens),
                KeyCode::Char('n') | KeyCode::Right => return Some(Action::NextPage),
                KeyCode::Char('p') | KeyCode::Left => return Some(Action::PrevPage),
                _ => {}
            },
            ViewLevel::Tokens { account_id, .. } => match key.code {
                KeyCode::Up | KeyCode::Char('k') => self.detail.tokens.select_prev(),
                KeyCode::Down | KeyCode::Char('j') => self.detail.tokens.select_next(),
                KeyCode::Enter | KeyCode::Char('c') => return Some(Action::CopyToken),
                KeyCode::Char('s') => return Some(Action::SyncTokens),
                KeyCode::Char('a') => self.open_form(Form::token(account_id, None)),
                KeyCode::Char('e') => {
                    if let Some(token) = self.detail.tokens.selected_item() {
                        let form = Form::token(account_id, Some(token));
                        self.open_form(form);
                    }
                }
                KeyCode::Char('d') => {
                    if let Some(token) = self.detail.tokens.selected_item() {
                        let name = token.name.clone().unwrap_or_else(|| token.token_id.to_string());
                        self.confirm = Some(Confirm::new(
                            ConfirmAction::DeleteToken {
                                account_id,
                                token_id: token.token_id,
                            },
                            format!("Delete token {}?", name),
                        ));
                    }
                }
                _ => {}
            },
        }
        None
    }

    fn sign_logs_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.sign_logs.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.sign_logs.select_next(),
            KeyCode::Char('n') | KeyCode::Right => return Some(Action::NextPage),
            KeyCode::Char('p') | KeyCode::Left => return Some(Action::PrevPage),
            KeyCode::Char('f') => return Some(Action::CycleSuccessFilter),
            KeyCode::Char('a') => return Some(Action::CycleAccountFilter),
            KeyCode::Char('D') => {
                let query = &self.sign_logs.query;
                let form = Form::sign_log_dates(query.start_date.as_deref(), query.end_date.as_deref());
                self.open_form(form);
            }
            _ => {}
        }
        None
    }

    fn notify_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.notify.channels.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.notify.channels.select_next(),
            KeyCode::Enter | KeyCode::Char(' ') => return Some(Action::ToggleChannel),
            KeyCode::Char('t') => return Some(Action::Open),
            KeyCode::Char('d') => {
                if let Some(channel) = self.notify.channels.selected_item() {
                    self.confirm = Some(Confirm::new(
                        ConfirmAction::DeleteChannel(channel.id),
                        format!("Delete channel {}?", channel.name),
                    ));
                }
            }
            KeyCode::Char(c) => {
                let index = c.to_digit(10).and_then(|d| (d as usize).checked_sub(1));
                if let Some(channel_type) = index.and_then(|i| ChannelType::ALL.get(i)) {
                    self.open_form(Form::channel(*channel_type));
                }
            }
            _ => {}
        }
        None
    }

    fn settings_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.settings.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.settings.select_next(),
            KeyCode::Enter => {
                let field = self.settings.selected_field();
                if field.is_toggle() {
                    return Some(Action::ToggleSetting);
                }
                let current = self
                    .settings
                    .settings
                    .data()
                    .map(|s| field.value(s))
                    .unwrap_or_default();
                self.open_form(Form::setting(field, &current));
            }
            KeyCode::Char('p') => self.open_form(Form::change_password()),
            KeyCode::Char('e') => return Some(Action::ExportBackup { include_logs: false }),
            KeyCode::Char('E') => return Some(Action::ExportBackup { include_logs: true }),
            KeyCode::Char('i') => self.open_form(Form::import_backup()),
            KeyCode::Char('L') => {
                self.confirm = Some(Confirm::new(ConfirmAction::Logout, "Sign out of this console?"));
            }
            _ => {}
        }
        None
    }

    fn audit_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.audit.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.audit.select_next(),
            KeyCode::Char('n') | KeyCode::Right => return Some(Action::NextPage),
            KeyCode::Char('p') | KeyCode::Left => return Some(Action::PrevPage),
            KeyCode::Char('a') => return Some(Action::CycleAuditAction),
            KeyCode::Char('/') => {
                let form = Form::audit_keyword(self.audit.query.keyword.as_deref());
                self.open_form(form);
            }
            _ => {}
        }
        None
    }

    /// Run an action. Failures are already on the console; a rejected credential ends the session.
    pub async fn dispatch(&mut self, action: Action) {
        match self.perform(action).await {
            Err(err) if err.is_unauthorized() => self.expire_session(),
            _ => {}
        }
    }

    async fn perform(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Login => self.login().await,
            Action::SubmitForm => self.submit_form().await,
            Action::Confirm => self.run_confirmed().await,
            Action::SwitchTab(tab) => {
                self.active_tab = tab;
                self.console.set_viewing(tab == Tab::Console);
                if self.needs_load() {
                    self.refresh().await
                } else {
                    Ok(())
                }
            }
            Action::Refresh => self.refresh().await,
            Action::Open => self.open_selected().await,
            Action::NextPage => self.page(true).await,
            Action::PrevPage => self.page(false).await,
            Action::SignSelected => {
                let id = self.target_account()?;
                self.accounts
                    .sign_account(self.session.client(), &mut self.console, id)
                    .await?;
                self.refresh_detail_after_action().await
            }
            Action::HealthCheckSelected => {
                let id = self.target_account()?;
                self.accounts
                    .health_check(self.session.client(), &mut self.console, id)
                    .await?;
                self.refresh_detail_after_action().await
            }
            Action::HealthCheckAll => self
                .accounts
                .health_check_all(self.session.client(), &mut self.console)
                .await
                .map(drop),
            Action::ShowTokens => self.show_tokens().await,
            Action::SyncTokens => {
                let id = self.target_account()?;
                let tokens = self
                    .accounts
                    .sync_tokens(self.session.client(), &mut self.console, id)
                    .await?;
                self.detail.tokens.set_loaded(tokens);
                Ok(())
            }
            Action::CopyToken => {
                if let Some(token) = self.detail.tokens.selected_item() {
                    self.pending_copy = Some(full_token_key(&token.key));
                    self.console.success("Token key copied to clipboard");
                }
                Ok(())
            }
            Action::ToggleActive => {
                let Some(account) = self.accounts.selected_account() else {
                    return Ok(());
                };
                let (id, is_active) = (account.id, account.is_active);
                let params = crate::api::types::UpdateAccount {
                    is_active: Some(!is_active),
                    ..Default::default()
                };
                self.accounts
                    .update_account(self.session.client(), &mut self.console, id, &params)
                    .await
            }
            Action::MoveToNextGroup => {
                let Some(id) = self.accounts.selected_account().map(|a| a.id) else {
                    return Ok(());
                };
                self.accounts
                    .move_to_next_group(self.session.client(), &mut self.console, id)
                    .await
            }
            Action::ToggleChannel => match self.active_tab {
                Tab::Notify => {
                    let Some(id) = self.notify.channels.selected_item().map(|c| c.id) else {
                        return Ok(());
                    };
                    self.notify
                        .toggle(self.session.client(), &mut self.console, id)
                        .await
                        .map(drop)
                }
                _ => {
                    self.detail
                        .toggle_selected_channel(self.session.client(), &mut self.console)
                        .await
                }
            },
            Action::SyncEndpoints => self
                .dashboard
                .sync_endpoints(self.session.client(), &mut self.console)
                .await
                .map(drop),
            Action::CycleSuccessFilter => {
                self.sign_logs.cycle_success_filter();
                self.sign_logs
                    .fetch(self.session.client(), &mut self.console)
                    .await
            }
            Action::CycleAccountFilter => {
                if !self.accounts.accounts.is_loaded() {
                    self.accounts
                        .fetch_accounts(self.session.client(), &mut self.console)
                        .await?;
                }
                let ids: Vec<u64> = self.accounts.all().iter().map(|a| a.id).collect();
                let next = match self.sign_logs.query.account_id {
                    None => ids.first().copied(),
                    Some(current) => ids
                        .iter()
                        .position(|id| *id == current)
                        .and_then(|i| ids.get(i + 1))
                        .copied(),
                };
                self.sign_logs.set_account_filter(next);
                self.sign_logs
                    .fetch(self.session.client(), &mut self.console)
                    .await
            }
            Action::CycleDays => {
                self.statistics.cycle_days();
                self.statistics
                    .fetch_daily(self.session.client(), &mut self.console)
                    .await
            }
            Action::ToggleSetting => {
                self.settings
                    .toggle_selected(self.session.client(), &mut self.console)
                    .await
            }
            Action::ExportBackup { include_logs } => self
                .settings
                .export_backup(
                    self.session.client(),
                    &mut self.console,
                    &self.config.data_dir,
                    include_logs,
                )
                .await
                .map(drop),
            Action::CycleAuditAction => {
                self.audit.fetch_actions(self.session.client()).await;
                self.audit.cycle_action_filter();
                self.audit
                    .fetch(self.session.client(), &mut self.console)
                    .await
            }
            Action::ToggleTheme => {
                let mode = self
                    .console
                    .track(theme::toggle(self.session.preferences_mut(), self.system_dark))?;
                self.theme_mode = mode;
                self.console.info(format!("Theme set to {}", mode.as_str()));
                Ok(())
            }
        }
    }

    fn needs_load(&self) -> bool {
        match self.active_tab {
            Tab::Dashboard => self.dashboard.data.is_none() || self.dashboard.stale,
            Tab::Accounts => !self.accounts.accounts.is_loaded(),
            Tab::SignLogs => !self.sign_logs.logs.is_loaded(),
            Tab::Notify => !self.notify.channels.data.is_loaded(),
            Tab::Statistics => !self.statistics.overview.is_loaded(),
            Tab::Settings => !self.settings.settings.is_loaded(),
            Tab::Audit => !self.audit.logs.is_loaded(),
            Tab::Console => false,
        }
    }

    /// Reload whatever the active tab shows.
    pub async fn refresh(&mut self) -> Result<()> {
        let client = self.session.client();
        let console = &mut self.console;
        match self.active_tab {
            Tab::Dashboard => {
                self.dashboard.fetch_dashboard(client, console).await?;
                self.dashboard.fetch_endpoints(client, console).await
            }
            Tab::Accounts => match self.nav.current() {
                ViewLevel::Accounts => {
                    self.accounts.fetch_groups(client).await;
                    self.accounts.fetch_accounts(client, console).await
                }
                ViewLevel::Account { .. } => {
                    self.detail.fetch_info(client, console).await?;
                    self.detail.fetch_history(client, console, 1).await?;
                    self.detail.fetch_channels(client, console).await
                }
                ViewLevel::Tokens { .. } => self.detail.fetch_tokens(client, console).await,
            },
            Tab::SignLogs => self.sign_logs.fetch(client, console).await,
            Tab::Notify => self.notify.fetch(client, console).await,
            Tab::Statistics => self.statistics.fetch_all(client, console).await,
            Tab::Settings => self.settings.fetch(client, console).await,
            Tab::Audit => {
                self.audit.fetch_actions(client).await;
                self.audit.fetch(client, console).await
            }
            Tab::Console => Ok(()),
        }
    }

    /// Account targeted by the current view: the drilled-in account or the list selection.
    fn target_account(&self) -> Result<u64> {
        self.nav
            .current()
            .account_id()
            .or_else(|| self.accounts.selected_account().map(|a| a.id))
            .ok_or_else(|| ConsoleError::Other("no account selected".into()))
    }

    async fn refresh_detail_after_action(&mut self) -> Result<()> {
        if matches!(self.nav.current(), ViewLevel::Account { .. }) {
            let client = self.session.client();
            self.detail.fetch_info(client, &mut self.console).await?;
            self.detail.fetch_history(client, &mut self.console, 1).await?;
        }
        Ok(())
    }

    async fn open_selected(&mut self) -> Result<()> {
        match self.active_tab {
            Tab::Accounts => {
                let Some(account) = self.accounts.selected_account() else {
                    return Ok(());
                };
                let level = ViewLevel::Account {
                    account_id: account.id,
                    label: account.label(),
                };
                self.detail.open(account.id);
                self.nav.push(level);
                self.refresh().await
            }
            Tab::Notify => {
                let Some(id) = self.notify.channels.selected_item().map(|c| c.id) else {
                    return Ok(());
                };
                self.notify
                    .test(self.session.client(), &mut self.console, id)
                    .await
                    .map(drop)
            }
            _ => Ok(()),
        }
    }

    async fn show_tokens(&mut self) -> Result<()> {
        let (account_id, label) = match self.nav.current() {
            ViewLevel::Account { account_id, label } => (*account_id, label.clone()),
            ViewLevel::Accounts => match self.accounts.selected_account() {
                Some(account) => (account.id, account.label()),
                None => return Ok(()),
            },
            ViewLevel::Tokens { .. } => return Ok(()),
        };
        self.detail.open(account_id);
        self.nav.push(ViewLevel::Tokens { account_id, label });
        self.detail
            .fetch_tokens(self.session.client(), &mut self.console)
            .await
    }

    async fn page(&mut self, forward: bool) -> Result<()> {
        let client = self.session.client();
        let console = &mut self.console;
        match (self.active_tab, forward) {
            (Tab::SignLogs, true) => self.sign_logs.next_page(client, console).await,
            (Tab::SignLogs, false) => self.sign_logs.prev_page(client, console).await,
            (Tab::Audit, true) => self.audit.next_page(client, console).await,
            (Tab::Audit, false) => self.audit.prev_page(client, console).await,
            (Tab::Accounts, true) => self.detail.history_next(client, console).await,
            (Tab::Accounts, false) => self.detail.history_prev(client, console).await,
            _ => Ok(()),
        }
    }

    async fn login(&mut self) -> Result<()> {
        let (username, password) = match self.login_form.credentials() {
            Ok(credentials) => credentials,
            Err(err) => {
                self.login_error = Some(err.user_message());
                return Ok(());
            }
        };

        match self.session.login(&username, &password).await {
            Ok(()) => {
                self.login_form = Form::login();
                self.login_error = None;
                self.screen = Screen::Main;
                self.active_tab = Tab::Dashboard;
                self.console.success(format!("Signed in as {}", username));
                self.dashboard.load_snapshot();
                self.refresh().await
            }
            Err(err) => {
                self.console.report(&err);
                self.login_error = Some(err.user_message());
                Ok(())
            }
        }
    }

    async fn submit_form(&mut self) -> Result<()> {
        let Some(form) = self.form.take() else {
            return Ok(());
        };

        match self.submit(&form).await {
            Ok(()) => {
                self.form_error = None;
                Ok(())
            }
            Err(ConsoleError::Other(message)) => {
                // Local validation failure: keep the form open for correction.
                self.form_error = Some(message);
                self.form = Some(form);
                Ok(())
            }
            Err(err) => {
                self.form_error = Some(err.user_message());
                self.form = Some(form);
                Err(err)
            }
        }
    }

    async fn submit(&mut self, form: &Form) -> Result<()> {
        let client = self.session.client();
        let console = &mut self.console;
        match &form.kind {
            FormKind::Login => Ok(()),
            FormKind::AddAccount => {
                let params = form.create_account(self.accounts.selected_group_id)?;
                self.accounts
                    .create_account(client, console, &params)
                    .await
                    .map(drop)
            }
            FormKind::AddToken { account_id } => {
                let params = form.token_params(Local::now())?;
                self.accounts
                    .create_token(client, console, *account_id, &params)
                    .await?;
                self.detail.fetch_tokens(client, console).await
            }
            FormKind::EditToken {
                account_id,
                token_id,
            } => {
                let params = form.token_params(Local::now())?;
                self.accounts
                    .update_token(client, console, *account_id, *token_id, &params)
                    .await?;
                self.detail.fetch_tokens(client, console).await
            }
            FormKind::AddChannel(channel_type) => {
                let params = form.create_channel(*channel_type)?;
                self.notify.create(client, console, &params).await
            }
            FormKind::EditSetting(field) => {
                let update = form.settings_update(*field)?;
                self.settings.update(client, console, &update).await
            }
            FormKind::ChangePassword => {
                let (old, new) = form.password_change()?;
                console.track(client.change_password(&old, &new).await)?;
                tracing::info!("password changed");
                console.success("Password changed");
                Ok(())
            }
            FormKind::ImportBackup => {
                let (path, overwrite) = form.backup_import()?;
                self.settings
                    .import_backup(client, console, &path, overwrite)
                    .await
                    .map(drop)
            }
            FormKind::SignLogDates => {
                let (start, end) = form.date_range()?;
                self.sign_logs.set_date_range(start, end);
                self.sign_logs.fetch(client, console).await
            }
            FormKind::AuditKeyword => {
                self.audit.set_keyword(form.value("keyword"));
                self.audit.fetch(client, console).await
            }
        }
    }

    async fn run_confirmed(&mut self) -> Result<()> {
        let Some(confirm) = self.confirm.take() else {
            return Ok(());
        };
        let client = self.session.client();
        let console = &mut self.console;
        match confirm.action {
            ConfirmAction::DeleteAccount(id) => {
                self.accounts.delete_account(client, console, id).await
            }
            ConfirmAction::DeleteToken {
                account_id,
                token_id,
            } => {
                self.accounts
                    .delete_token(client, console, account_id, token_id)
                    .await?;
                self.detail.fetch_tokens(client, console).await
            }
            ConfirmAction::DeleteChannel(id) => self.notify.delete(client, console, id).await,
            ConfirmAction::SignAll => self.accounts.batch_sign(client, console).await.map(drop),
            ConfirmAction::Logout => {
                let result = self.session.logout();
                self.console.track(result)?;
                self.reset_to_login();
                self.console.info("Signed out");
                Ok(())
            }
        }
    }

    /// The server rejected the stored token: forget it and ask for credentials again.
    fn expire_session(&mut self) {
        self.session.expire();
        self.reset_to_login();
        self.console.warning("Session expired, please sign in again");
    }

    fn reset_to_login(&mut self) {
        self.screen = Screen::Login;
        self.active_tab = Tab::Dashboard;
        self.form = None;
        self.form_error = None;
        self.confirm = None;
        self.show_help = false;
        self.nav.reset();
        self.dashboard.reset();
        self.accounts.reset();
        self.detail = AccountDetailStore::new();
        self.sign_logs.reset();
        self.notify = NotifyStore::new();
        self.statistics.reset();
        self.settings.reset();
        self.audit.reset();
    }
}
