//! In-process simulation of the product registration application.
//!
//! `SimulatedApp` implements [`PageDriver`] over a small model of the real
//! page: a login screen, the "Controle de Produtos" screen with its Bootstrap
//! modal, the required-fields validation and the product table. The modal
//! fades in and out over a configurable transition, so the explicit waits are
//! exercised for real. Product rows live "server side" and survive reloads.
//!
//! Only the default selectors of [`ProductLocators`](crate::ProductLocators)
//! and [`LoginLocators`](crate::LoginLocators) resolve; anything else is
//! reported as absent.

use crate::driver::{ElementState, Key, PageDriver};
use crate::locator::Selector;
use crate::result::{E2eError, E2eResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

const REQUIRED_FIELDS: &str = "Todos os campos são obrigatórios para o cadastro!";
const LOGIN_FAILED: &str = "E-mail ou senha inválidos";
const PRODUCT_INPUTS: [&str; 5] = ["codigo", "nome", "quantidade", "valor", "data"];

/// Behavior knobs of the simulated application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Duration of the modal fade in/out
    pub transition_ms: u64,
    /// Accepted login e-mail
    pub email: String,
    /// Accepted login password
    pub password: String,
    /// Title of the login screen
    pub login_title: String,
    /// Title of the product screen
    pub products_title: String,
    /// Delay before a saved product shows up in the table
    pub save_delay_ms: u64,
    /// Reproduce the double-bound click handler: after every page load the
    /// first click on "Criar" toggles the modal twice and shows nothing
    pub swallow_first_click: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            transition_ms: 150,
            email: "admin@admin.com".to_string(),
            password: "admin@123".to_string(),
            login_title: "Login".to_string(),
            products_title: "Controle de Produtos".to_string(),
            save_delay_ms: 0,
            swallow_first_click: false,
        }
    }
}

impl SimConfig {
    /// Set the modal transition duration
    #[must_use]
    pub const fn with_transition_ms(mut self, ms: u64) -> Self {
        self.transition_ms = ms;
        self
    }

    /// Enable the double-bound click quirk
    #[must_use]
    pub const fn with_swallow_first_click(mut self, enabled: bool) -> Self {
        self.swallow_first_click = enabled;
        self
    }

    /// Set the delay before saved products are listed
    #[must_use]
    pub const fn with_save_delay_ms(mut self, ms: u64) -> Self {
        self.save_delay_ms = ms;
        self
    }

    const fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }
}

/// A product persisted by the simulated backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Product code
    pub code: String,
    /// Product name
    pub name: String,
    /// Quantity as typed
    pub quantity: String,
    /// Value as typed
    pub value: String,
    /// Registration date as typed
    pub date: String,
}

impl ProductRecord {
    fn cells(&self) -> [&str; 5] {
        [
            &self.code,
            &self.name,
            &self.quantity,
            &self.value,
            &self.date,
        ]
    }

    fn to_html(&self) -> String {
        let cells: String = self
            .cells()
            .iter()
            .map(|cell| format!("<td>{}</td>", escape_html(cell)))
            .collect();
        format!("<tr>{cells}</tr>")
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Blank,
    Login,
    Products,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Modal {
    Closed,
    Opening { ready_at: Instant },
    Open,
    Closing { hidden_at: Instant },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
    LoginInput(&'static str),
    LoginButton,
    CreateButton,
    Modal,
    ProductInput(&'static str),
    SaveButton,
    ExitButton,
    Message,
    Alert,
    TableBody,
    FirstRow,
    FirstRowCell(usize),
}

#[derive(Debug)]
struct AppState {
    screen: Screen,
    modal: Modal,
    inputs: HashMap<&'static str, String>,
    message: String,
    alert_visible: bool,
    login_error: bool,
    rows: Vec<ProductRecord>,
    pending: Vec<(Instant, ProductRecord)>,
    create_armed: bool,
    history: Vec<String>,
    closed: bool,
}

impl AppState {
    fn new(screen: Screen) -> Self {
        Self {
            screen,
            modal: Modal::Closed,
            inputs: HashMap::new(),
            message: String::new(),
            alert_visible: false,
            login_error: false,
            rows: Vec::new(),
            pending: Vec::new(),
            create_armed: false,
            history: Vec::new(),
            closed: false,
        }
    }

    /// Advance timed transitions and pending saves to the current instant
    fn settle(&mut self) {
        let now = Instant::now();
        self.modal = match self.modal {
            Modal::Opening { ready_at } if now >= ready_at => Modal::Open,
            Modal::Closing { hidden_at } if now >= hidden_at => Modal::Closed,
            other => other,
        };

        let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|(at, _)| now >= *at);
        self.pending = waiting;
        for (_, record) in due {
            // Newest product is listed first
            self.rows.insert(0, record);
        }
    }

    fn resolve(&self, selector: &Selector) -> Option<Element> {
        let css = selector.to_css();
        let element = match self.screen {
            Screen::Blank => None,
            Screen::Login => match css.as_str() {
                "#email" => Some(Element::LoginInput("email")),
                "#senha" => Some(Element::LoginInput("senha")),
                "#btn-entrar" => Some(Element::LoginButton),
                "#mensagem" => Some(Element::Message),
                _ => None,
            },
            Screen::Products => match css.as_str() {
                "#btn-adicionar" => Some(Element::CreateButton),
                "#cadastro-produto" => Some(Element::Modal),
                "#btn-salvar" => Some(Element::SaveButton),
                "#btn-sair" => Some(Element::ExitButton),
                "#mensagem" => Some(Element::Message),
                "#cadastro-produto .alert" => Some(Element::Alert),
                "table tbody" => Some(Element::TableBody),
                "table tbody tr:first-child" => Some(Element::FirstRow),
                other => PRODUCT_INPUTS
                    .iter()
                    .copied()
                    .find(|id| other.strip_prefix('#') == Some(*id))
                    .map(Element::ProductInput)
                    .or_else(|| {
                        other
                            .strip_prefix("table tbody tr:first-child td:nth-child(")
                            .and_then(|rest| rest.strip_suffix(')'))
                            .and_then(|n| n.parse::<usize>().ok())
                            .filter(|n| (1..=5).contains(n))
                            .map(Element::FirstRowCell)
                    }),
            },
        }?;

        // Row markup only exists once something was saved
        match element {
            Element::FirstRow | Element::FirstRowCell(_) if self.rows.is_empty() => None,
            other => Some(other),
        }
    }

    fn state_of(&self, element: Element) -> ElementState {
        let modal_open = self.modal == Modal::Open;
        let (displayed, enabled) = match element {
            Element::LoginInput(_) | Element::LoginButton | Element::TableBody => (true, true),
            Element::FirstRow | Element::FirstRowCell(_) | Element::CreateButton => (true, true),
            Element::Modal => (self.modal != Modal::Closed, true),
            Element::ProductInput(_) | Element::SaveButton | Element::ExitButton => {
                (modal_open, true)
            }
            Element::Message | Element::Alert => match self.screen {
                Screen::Login => (self.login_error, true),
                _ => (modal_open && self.alert_visible, true),
            },
        };
        ElementState { displayed, enabled }
    }

    fn text_of(&self, element: Element) -> String {
        if !self.state_of(element).displayed {
            return String::new();
        }
        match element {
            Element::LoginButton => "Entrar".to_string(),
            Element::CreateButton => "Criar".to_string(),
            Element::SaveButton => "Salvar".to_string(),
            Element::ExitButton => "Sair".to_string(),
            Element::Message | Element::Alert => self.message.clone(),
            Element::TableBody => self
                .rows
                .iter()
                .map(|row| row.cells().join(" "))
                .collect::<Vec<_>>()
                .join("\n"),
            Element::FirstRow => self.rows.first().map(|r| r.cells().join(" ")).unwrap_or_default(),
            Element::FirstRowCell(n) => self
                .rows
                .first()
                .map(|r| r.cells()[n - 1].to_string())
                .unwrap_or_default(),
            Element::LoginInput(_) | Element::ProductInput(_) | Element::Modal => String::new(),
        }
    }

    fn attribute_of(&self, element: Element, name: &str) -> Option<String> {
        match (element, name) {
            (Element::Modal, "class") => Some(
                if matches!(self.modal, Modal::Open) {
                    "modal fade show"
                } else {
                    "modal fade"
                }
                .to_string(),
            ),
            (Element::Alert, "class") => Some(
                if self.alert_visible {
                    "alert alert-danger"
                } else {
                    "alert alert-danger esconder"
                }
                .to_string(),
            ),
            (Element::TableBody, "innerHTML") => {
                Some(self.rows.iter().map(ProductRecord::to_html).collect())
            }
            (Element::FirstRow, "innerHTML") => self.rows.first().map(|row| {
                let html = row.to_html();
                html["<tr>".len()..html.len() - "</tr>".len()].to_string()
            }),
            (Element::LoginInput(id) | Element::ProductInput(id), "value") => {
                Some(self.inputs.get(id).cloned().unwrap_or_default())
            }
            (_, "id") => match element {
                Element::LoginInput(id) | Element::ProductInput(id) => Some(id.to_string()),
                _ => None,
            },
            _ => None,
        }
    }

    fn submit_login(&mut self, config: &SimConfig) {
        let email = self.inputs.get("email").map(String::as_str).unwrap_or("");
        let password = self.inputs.get("senha").map(String::as_str).unwrap_or("");
        if email == config.email && password == config.password {
            self.screen = Screen::Products;
            self.login_error = false;
            self.message.clear();
            self.inputs.clear();
            self.create_armed = config.swallow_first_click;
        } else {
            self.login_error = true;
            self.message = LOGIN_FAILED.to_string();
        }
    }

    fn submit_product(&mut self, config: &SimConfig) {
        let value = |id: &str| self.inputs.get(id).cloned().unwrap_or_default();
        let record = ProductRecord {
            code: value("codigo"),
            name: value("nome"),
            quantity: value("quantidade"),
            value: value("valor"),
            date: value("data"),
        };

        if record.cells().iter().any(|cell| cell.trim().is_empty()) {
            self.message = REQUIRED_FIELDS.to_string();
            self.alert_visible = true;
            return;
        }

        let listed_at = Instant::now() + Duration::from_millis(config.save_delay_ms);
        self.pending.push((listed_at, record));
        for id in PRODUCT_INPUTS {
            let _ = self.inputs.remove(id);
        }
        self.message.clear();
        self.alert_visible = false;
    }

    fn reload(&mut self, config: &SimConfig) {
        self.modal = Modal::Closed;
        self.inputs.clear();
        self.message.clear();
        self.alert_visible = false;
        self.login_error = false;
        self.create_armed = self.screen == Screen::Products && config.swallow_first_click;
    }
}

/// Simulated product registration application
#[derive(Debug)]
pub struct SimulatedApp {
    config: SimConfig,
    state: Mutex<AppState>,
}

impl SimulatedApp {
    /// Start on a blank page; navigate to reach the login screen
    #[must_use]
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            state: Mutex::new(AppState::new(Screen::Blank)),
        }
    }

    /// Start already authenticated on the product screen
    #[must_use]
    pub fn logged_in(config: SimConfig) -> Self {
        let mut state = AppState::new(Screen::Products);
        state.create_armed = config.swallow_first_click;
        Self {
            config,
            state: Mutex::new(state),
        }
    }

    /// The configuration the app runs with
    #[must_use]
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Products persisted so far, newest first
    pub async fn rows(&self) -> Vec<ProductRecord> {
        self.state.lock().await.rows.clone()
    }

    /// Every primitive issued against the app, in order
    pub async fn history(&self) -> Vec<String> {
        self.state.lock().await.history.clone()
    }

    /// Forget the recorded history
    pub async fn clear_history(&self) {
        self.state.lock().await.history.clear();
    }

    /// Lock the state, advancing timed transitions and refusing closed sessions
    async fn live(&self) -> E2eResult<tokio::sync::MutexGuard<'_, AppState>> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(E2eError::driver("session is closed"));
        }
        state.settle();
        Ok(state)
    }

    fn lookup(state: &AppState, selector: &Selector) -> E2eResult<Element> {
        state
            .resolve(selector)
            .ok_or_else(|| E2eError::ElementNotFound {
                selector: selector.to_css(),
            })
    }

    fn interactable(state: &AppState, selector: &Selector) -> E2eResult<Element> {
        let element = Self::lookup(state, selector)?;
        if state.state_of(element).is_clickable() {
            Ok(element)
        } else {
            Err(E2eError::NotInteractable {
                selector: selector.to_css(),
            })
        }
    }

    fn input_id(element: Element, selector: &Selector) -> E2eResult<&'static str> {
        match element {
            Element::LoginInput(id) | Element::ProductInput(id) => Ok(id),
            _ => Err(E2eError::NotInteractable {
                selector: selector.to_css(),
            }),
        }
    }
}

#[async_trait]
impl PageDriver for SimulatedApp {
    async fn navigate(&self, url: &str) -> E2eResult<()> {
        let mut state = self.live().await?;
        state.history.push(format!("navigate {url}"));
        if url.is_empty() || url == "about:blank" {
            state.screen = Screen::Blank;
        } else {
            state.screen = Screen::Login;
        }
        state.reload(&self.config);
        Ok(())
    }

    async fn reload(&self) -> E2eResult<()> {
        let mut state = self.live().await?;
        state.history.push("reload".to_string());
        state.reload(&self.config);
        Ok(())
    }

    async fn title(&self) -> E2eResult<String> {
        let state = self.live().await?;
        Ok(match state.screen {
            Screen::Blank => String::new(),
            Screen::Login => self.config.login_title.clone(),
            Screen::Products => self.config.products_title.clone(),
        })
    }

    async fn probe(&self, selector: &Selector) -> E2eResult<Option<ElementState>> {
        let state = self.live().await?;
        Ok(state
            .resolve(selector)
            .map(|element| state.state_of(element)))
    }

    async fn click(&self, selector: &Selector) -> E2eResult<()> {
        let mut state = self.live().await?;
        let element = Self::interactable(&state, selector)?;
        state.history.push(format!("click {selector}"));

        let modal = state.modal;
        match element {
            Element::LoginButton => state.submit_login(&self.config),
            Element::CreateButton => match modal {
                Modal::Closed if state.create_armed => state.create_armed = false,
                Modal::Closed => {
                    state.modal = Modal::Opening {
                        ready_at: Instant::now() + self.config.transition(),
                    };
                    state.alert_visible = false;
                    state.message.clear();
                }
                // Criar sits under the backdrop; the click dismisses the dialog
                Modal::Opening { .. } | Modal::Open => {
                    state.modal = Modal::Closing {
                        hidden_at: Instant::now() + self.config.transition(),
                    };
                }
                Modal::Closing { .. } => {}
            },
            Element::SaveButton => state.submit_product(&self.config),
            Element::ExitButton => {
                state.modal = Modal::Closing {
                    hidden_at: Instant::now() + self.config.transition(),
                };
            }
            _ => {}
        }
        // Zero-length transitions and saves complete within the same tick
        state.settle();
        Ok(())
    }

    async fn clear(&self, selector: &Selector) -> E2eResult<()> {
        let mut state = self.live().await?;
        let element = Self::interactable(&state, selector)?;
        let id = Self::input_id(element, selector)?;
        state.history.push(format!("clear {selector}"));
        let _ = state.inputs.insert(id, String::new());
        Ok(())
    }

    async fn send_keys(&self, selector: &Selector, text: &str) -> E2eResult<()> {
        let mut state = self.live().await?;
        let element = Self::interactable(&state, selector)?;
        let id = Self::input_id(element, selector)?;
        state.history.push(format!("type {selector} {text:?}"));
        state.inputs.entry(id).or_default().push_str(text);
        Ok(())
    }

    async fn press_key(&self, selector: &Selector, key: Key) -> E2eResult<()> {
        let mut state = self.live().await?;
        let element = Self::interactable(&state, selector)?;
        state.history.push(format!("key {selector} {key}"));
        if key == Key::Enter && matches!(element, Element::LoginInput(_)) {
            state.submit_login(&self.config);
        }
        Ok(())
    }

    async fn text(&self, selector: &Selector) -> E2eResult<String> {
        let state = self.live().await?;
        let element = Self::lookup(&state, selector)?;
        Ok(state.text_of(element))
    }

    async fn attribute(&self, selector: &Selector, name: &str) -> E2eResult<Option<String>> {
        let state = self.live().await?;
        let element = Self::lookup(&state, selector)?;
        Ok(state.attribute_of(element, name))
    }

    async fn close(&self) -> E2eResult<()> {
        let mut state = self.state.lock().await;
        state.history.push("close".to_string());
        state.closed = true;
        Ok(())
    }
}
