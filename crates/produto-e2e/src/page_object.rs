//! Page objects for the login screen and the product registration screen.
//!
//! Page objects own the locator bindings of their view and expose named
//! operations; scenarios never touch selectors directly.
//!
//! The registration modal follows a small state machine:
//!
//! ```text
//! Closed --click Criar--> Opening --class has "show"--> (first field clickable) Ready
//!   ^                                                                            |
//!   +---------------------------- click Sair, wait invisible --------------------+
//! ```
//!
//! Writing a field is only allowed in `Ready`.

use crate::driver::PageDriver;
use crate::interaction::{ClickDispatch, Interactor};
use crate::locator::{Locator, Selector};
use crate::result::{E2eError, E2eResult};
use crate::wait::{Condition, WaitOptions};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Trait for page objects representing a page of the application
pub trait PageObject {
    /// Get the page name for logging/debugging
    fn page_name(&self) -> &str;

    /// Substring the document title carries while this page is shown.
    /// Empty when any title will do.
    fn title_marker(&self) -> &str;

    /// Element that is clickable once the page is ready for interaction
    fn ready_marker(&self) -> &Locator;
}

/// Block until `page` is the current page and ready for interaction
pub async fn wait_until_loaded<D, P>(ui: &Interactor<'_, D>, page: &P) -> E2eResult<()>
where
    D: PageDriver + ?Sized,
    P: PageObject + ?Sized,
{
    let step = format!("load {}", page.page_name());
    if !page.title_marker().is_empty() {
        ui.wait_for_title(&step, page.title_marker()).await?;
    }
    ui.wait_for(&step, page.ready_marker(), &Condition::Clickable)
        .await?;
    debug!(page = page.page_name(), "page loaded");
    Ok(())
}

// =============================================================================
// LOCATOR BINDINGS
// =============================================================================

/// Selectors of the login screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginLocators {
    /// E-mail input
    pub email: Selector,
    /// Password input
    pub password: Selector,
    /// "Entrar" button
    pub submit: Selector,
}

impl Default for LoginLocators {
    fn default() -> Self {
        Self {
            email: Selector::id("email"),
            password: Selector::id("senha"),
            submit: Selector::id("btn-entrar"),
        }
    }
}

/// Selectors of the product registration screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductLocators {
    /// Code input
    pub code: Selector,
    /// Name input
    pub name: Selector,
    /// Quantity input
    pub quantity: Selector,
    /// Value input
    pub value: Selector,
    /// Registration date input
    pub date: Selector,
    /// "Criar" button, opens the modal
    pub create_button: Selector,
    /// "Salvar" button inside the modal
    pub save_button: Selector,
    /// "Sair" button inside the modal
    pub exit_button: Selector,
    /// The registration modal itself
    pub modal: Selector,
    /// Validation message span
    pub message: Selector,
    /// Alert box wrapping the message
    pub alert: Selector,
    /// Body of the product table
    pub table_body: Selector,
    /// Code cell of the first table row
    pub first_row_code: Selector,
    /// Name cell of the first table row
    pub first_row_name: Selector,
}

impl Default for ProductLocators {
    fn default() -> Self {
        Self {
            code: Selector::id("codigo"),
            name: Selector::id("nome"),
            quantity: Selector::id("quantidade"),
            value: Selector::id("valor"),
            date: Selector::id("data"),
            create_button: Selector::id("btn-adicionar"),
            save_button: Selector::id("btn-salvar"),
            exit_button: Selector::id("btn-sair"),
            modal: Selector::id("cadastro-produto"),
            message: Selector::id("mensagem"),
            alert: Selector::css("#cadastro-produto .alert"),
            table_body: Selector::css("table tbody"),
            first_row_code: Selector::css("table tbody tr:first-child td:nth-child(1)"),
            first_row_name: Selector::css("table tbody tr:first-child td:nth-child(2)"),
        }
    }
}

// =============================================================================
// FORM DATA
// =============================================================================

/// Fields of the registration form, in fill order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Product code
    Code,
    /// Product name
    Name,
    /// Quantity
    Quantity,
    /// Unit value
    Value,
    /// Registration date
    Date,
}

impl Field {
    /// All fields in the order the form is filled
    pub const ALL: [Self; 5] = [
        Self::Code,
        Self::Name,
        Self::Quantity,
        Self::Value,
        Self::Date,
    ];

    /// Field name used in logs and step descriptions
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Code => "code field",
            Self::Name => "name field",
            Self::Quantity => "quantity field",
            Self::Value => "value field",
            Self::Date => "date field",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Values submitted through the registration modal.
///
/// An empty string and an omitted field are the same thing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    /// Product code
    pub code: String,
    /// Product name
    pub name: String,
    /// Quantity
    pub quantity: String,
    /// Unit value
    pub value: String,
    /// Registration date
    pub date: String,
}

impl ProductForm {
    /// Form with every field set
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        quantity: impl Into<String>,
        value: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            quantity: quantity.into(),
            value: value.into(),
            date: date.into(),
        }
    }

    /// Form with every field empty
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Set one field
    #[must_use]
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        *self.slot(field) = value.into();
        self
    }

    /// Value of one field
    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Code => &self.code,
            Field::Name => &self.name,
            Field::Quantity => &self.quantity,
            Field::Value => &self.value,
            Field::Date => &self.date,
        }
    }

    fn slot(&mut self, field: Field) -> &mut String {
        match field {
            Field::Code => &mut self.code,
            Field::Name => &mut self.name,
            Field::Quantity => &mut self.quantity,
            Field::Value => &mut self.value,
            Field::Date => &mut self.date,
        }
    }

    /// Fields carrying a non-empty value, in fill order
    #[must_use]
    pub fn filled_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| !self.get(*field).is_empty())
            .collect()
    }

    /// Whether every field carries a value
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.filled_fields().len() == Field::ALL.len()
    }
}

/// Code and name read back from the first row of the product table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRow {
    /// Product code column
    pub code: String,
    /// Product name column
    pub name: String,
}

/// State of the registration modal as tracked by the page object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalState {
    /// Not shown
    #[default]
    Closed,
    /// Create was clicked, the fade-in has not finished
    Opening,
    /// Shown and the first field accepts input
    Ready,
}

impl fmt::Display for ModalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Closed => "closed",
            Self::Opening => "opening",
            Self::Ready => "ready",
        };
        f.write_str(name)
    }
}

// =============================================================================
// LOGIN PAGE
// =============================================================================

/// Login screen
#[derive(Debug)]
pub struct LoginPage<'d, D: PageDriver + ?Sized> {
    ui: Interactor<'d, D>,
    title: String,
    email: Locator,
    password: Locator,
    submit: Locator,
}

impl<'d, D: PageDriver + ?Sized> LoginPage<'d, D> {
    /// Bind the login screen
    #[must_use]
    pub fn new(driver: &'d D, locators: &LoginLocators, wait: WaitOptions) -> Self {
        Self {
            ui: Interactor::new(driver, wait),
            title: String::new(),
            email: Locator::new("e-mail field", locators.email.clone()),
            password: Locator::new("password field", locators.password.clone()),
            submit: Locator::new("login button", locators.submit.clone()),
        }
    }

    /// Require the document title to contain `title` before logging in
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Fill the credentials and press "Entrar"
    pub async fn login(&self, email: &str, password: &str) -> E2eResult<()> {
        wait_until_loaded(&self.ui, self).await?;
        self.ui.write(&self.email, email).await?;
        self.ui.write(&self.password, password).await?;
        self.ui.click(&self.submit).await?;
        info!(email, "submitted login");
        Ok(())
    }
}

impl<D: PageDriver + ?Sized> PageObject for LoginPage<'_, D> {
    fn page_name(&self) -> &str {
        "login page"
    }

    fn title_marker(&self) -> &str {
        &self.title
    }

    fn ready_marker(&self) -> &Locator {
        &self.submit
    }
}

// =============================================================================
// PRODUCT PAGE
// =============================================================================

/// "Controle de Produtos" screen with its registration modal
#[derive(Debug)]
pub struct ProductPage<'d, D: PageDriver + ?Sized> {
    ui: Interactor<'d, D>,
    title: String,
    dispatch: ClickDispatch,
    modal_state: ModalState,
    code: Locator,
    name: Locator,
    quantity: Locator,
    value: Locator,
    date: Locator,
    create_button: Locator,
    save_button: Locator,
    exit_button: Locator,
    modal: Locator,
    message: Locator,
    alert: Locator,
    table_body: Locator,
    first_row_code: Locator,
    first_row_name: Locator,
}

impl<'d, D: PageDriver + ?Sized> ProductPage<'d, D> {
    /// Bind the product screen. `title` is the document title of the page.
    #[must_use]
    pub fn new(
        driver: &'d D,
        locators: &ProductLocators,
        wait: WaitOptions,
        title: impl Into<String>,
    ) -> Self {
        let bind = |name: &'static str, selector: &Selector| Locator::new(name, selector.clone());
        Self {
            ui: Interactor::new(driver, wait),
            title: title.into(),
            dispatch: ClickDispatch::Single,
            modal_state: ModalState::Closed,
            code: bind(Field::Code.label(), &locators.code),
            name: bind(Field::Name.label(), &locators.name),
            quantity: bind(Field::Quantity.label(), &locators.quantity),
            value: bind(Field::Value.label(), &locators.value),
            date: bind(Field::Date.label(), &locators.date),
            create_button: bind("create button", &locators.create_button),
            save_button: bind("save button", &locators.save_button),
            exit_button: bind("exit button", &locators.exit_button),
            modal: bind("registration modal", &locators.modal),
            message: bind("validation message", &locators.message),
            alert: bind("alert box", &locators.alert),
            table_body: bind("product table", &locators.table_body),
            first_row_code: bind("first row code", &locators.first_row_code),
            first_row_name: bind("first row name", &locators.first_row_name),
        }
    }

    /// Dispatch policy for the Create and Exit buttons; Save always gets one click
    #[must_use]
    pub fn with_click_dispatch(mut self, dispatch: ClickDispatch) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Modal state as tracked by this page object
    #[must_use]
    pub const fn modal_state(&self) -> ModalState {
        self.modal_state
    }

    /// Locator bound to a form field
    #[must_use]
    pub const fn field(&self, field: Field) -> &Locator {
        match field {
            Field::Code => &self.code,
            Field::Name => &self.name,
            Field::Quantity => &self.quantity,
            Field::Value => &self.value,
            Field::Date => &self.date,
        }
    }

    fn require(&self, expected: ModalState, action: &str) -> E2eResult<()> {
        if self.modal_state == expected {
            Ok(())
        } else {
            Err(E2eError::invalid_state(format!(
                "cannot {action} while the registration modal is {} (needs {expected})",
                self.modal_state
            )))
        }
    }

    /// Document title
    pub async fn title(&self) -> E2eResult<String> {
        self.ui.driver().title().await
    }

    /// Wait until the page is loaded and Create is clickable
    pub async fn wait_until_ready(&self) -> E2eResult<()> {
        wait_until_loaded(&self.ui, self).await
    }

    /// Click "Criar" and wait for the modal to be Ready
    pub async fn open_modal(&mut self) -> E2eResult<()> {
        self.require(ModalState::Closed, "open the modal")?;
        self.ui.click(&self.create_button).await?;
        self.modal_state = ModalState::Opening;

        let step = "open registration modal";
        self.ui
            .await_click_effect(
                step,
                &self.create_button,
                self.dispatch,
                &self.modal,
                &Condition::attribute_contains("class", "show"),
            )
            .await?;
        self.ui
            .wait_for(step, &self.code, &Condition::Clickable)
            .await?;
        self.modal_state = ModalState::Ready;
        debug!("registration modal ready");
        Ok(())
    }

    /// Write every field of `form` in fill order
    pub async fn fill_form(&self, form: &ProductForm) -> E2eResult<()> {
        self.require(ModalState::Ready, "fill the form")?;
        for field in Field::ALL {
            self.ui.write(self.field(field), form.get(field)).await?;
        }
        Ok(())
    }

    /// Click "Salvar"
    ///
    /// Always a single click: the button stays clickable after a rejected
    /// submission, so a second dispatch would submit twice.
    pub async fn submit(&self) -> E2eResult<()> {
        self.require(ModalState::Ready, "submit")?;
        self.ui.click(&self.save_button).await
    }

    /// Click "Sair" and wait for the modal to disappear
    pub async fn close_modal(&mut self) -> E2eResult<()> {
        self.require(ModalState::Ready, "close the modal")?;
        self.ui.click(&self.exit_button).await?;
        self.ui
            .await_click_effect(
                "close registration modal",
                &self.exit_button,
                self.dispatch,
                &self.modal,
                &Condition::Invisible,
            )
            .await?;
        self.modal_state = ModalState::Closed;
        debug!("registration modal closed");
        Ok(())
    }

    /// Open the modal, fill `form` and save
    pub async fn register(&mut self, form: &ProductForm) -> E2eResult<()> {
        info!(filled = ?form.filled_fields(), "registering product");
        self.open_modal().await?;
        self.fill_form(form).await?;
        self.submit().await
    }

    /// Text of the validation message
    pub async fn message(&self) -> E2eResult<String> {
        self.ui.read_text(&self.message).await
    }

    /// Whether the alert box is shown (its class lacks `esconder`)
    pub async fn alert_visible(&self) -> E2eResult<bool> {
        Ok(self
            .ui
            .read_attribute(&self.alert, "class")
            .await?
            .is_some_and(|class| !class.contains("esconder")))
    }

    /// Whether the product table lists at least one row.
    ///
    /// Waits up to the configured bound for row markup to appear. A table
    /// that never shows a row, or cannot be resolved at all, reads as `false`.
    /// Rows saved earlier satisfy it at once; see [`Self::first_row_with_code`].
    pub async fn product_exists(&self) -> E2eResult<bool> {
        let driver = self.ui.driver();
        let table = self.table_body.selector();
        let found = self
            .ui
            .waiter()
            .poll(
                "look for product rows",
                format!("{table} to contain a row"),
                move || async move {
                    Ok::<bool, E2eError>(
                        driver
                            .attribute(table, "innerHTML")
                            .await?
                            .is_some_and(|html| html.contains("<tr")),
                    )
                },
            )
            .await;

        match found {
            Ok(_) => Ok(true),
            Err(e) if e.is_timeout() => {
                debug!(error = %e, "no product row found");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Code and name of the first table row
    pub async fn first_row(&self) -> E2eResult<ProductRow> {
        Ok(ProductRow {
            code: self.ui.read_text(&self.first_row_code).await?,
            name: self.ui.read_text(&self.first_row_name).await?,
        })
    }

    /// First table row, once its code reads `code`.
    ///
    /// Rows from earlier registrations stay listed, so the table can show a
    /// previous product until the new save lands. If `code` never shows up
    /// within the wait bound, the row as currently listed is returned.
    pub async fn first_row_with_code(&self, code: &str) -> E2eResult<ProductRow> {
        let driver = self.ui.driver();
        let cell = self.first_row_code.selector();
        let listed = self
            .ui
            .waiter()
            .poll(
                "wait for saved product",
                format!("{cell} to read {code:?}"),
                move || async move { Ok::<bool, E2eError>(driver.text(cell).await? == code) },
            )
            .await;

        match listed {
            Ok(_) => {}
            Err(e) if e.is_timeout() => debug!(error = %e, "expected row not listed"),
            Err(e) => return Err(e),
        }
        self.first_row().await
    }
}

impl<D: PageDriver + ?Sized> PageObject for ProductPage<'_, D> {
    fn page_name(&self) -> &str {
        "product page"
    }

    fn title_marker(&self) -> &str {
        &self.title
    }

    fn ready_marker(&self) -> &Locator {
        &self.create_button
    }
}
