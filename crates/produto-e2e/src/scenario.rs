//! Registration scenarios and their expected outcomes.

use crate::driver::PageDriver;
use crate::page_object::{ProductForm, ProductPage};
use crate::result::{E2eError, E2eResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Message shown when any field is missing on save
pub const REQUIRED_FIELDS_MESSAGE: &str = "Todos os campos são obrigatórios para o cadastro!";

/// What a scenario asserts after saving
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expectation {
    /// The modal shows exactly this validation message
    ValidationMessage {
        /// Expected message text
        text: String,
    },
    /// The table lists a product and its first row carries these values
    RowListed {
        /// Expected code column
        code: String,
        /// Expected name column
        name: String,
    },
}

impl Expectation {
    /// The required-fields validation message
    #[must_use]
    pub fn required_fields() -> Self {
        Self::ValidationMessage {
            text: REQUIRED_FIELDS_MESSAGE.to_string(),
        }
    }
}

/// One named registration attempt with its expected outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name, e.g. `TC001_all_fields_empty`
    pub name: String,
    /// Human readable description
    pub description: String,
    /// Values submitted through the modal
    pub form: ProductForm,
    /// Outcome asserted after saving
    pub expectation: Expectation,
}

impl Scenario {
    /// Create a scenario
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        form: ProductForm,
        expectation: Expectation,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            form,
            expectation,
        }
    }

    /// Register the form and assert the expectation.
    ///
    /// Validation-message scenarios leave the modal closed again. The first
    /// failed assertion ends the scenario.
    pub async fn run<D: PageDriver + ?Sized>(&self, page: &mut ProductPage<'_, D>) -> E2eResult<()> {
        page.register(&self.form).await?;

        match &self.expectation {
            Expectation::ValidationMessage { text } => {
                let actual = page.message().await?;
                if actual != *text {
                    return Err(E2eError::assertion("validation message", text, actual));
                }
                page.close_modal().await?;
            }
            Expectation::RowListed { code, name } => {
                if !page.product_exists().await? {
                    return Err(E2eError::assertion(
                        "product table",
                        "at least one row",
                        "no rows",
                    ));
                }
                let row = page.first_row_with_code(code).await?;
                if row.code != *code {
                    return Err(E2eError::assertion("first row code", code, row.code));
                }
                if row.name != *name {
                    return Err(E2eError::assertion("first row name", name, row.name));
                }
            }
        }
        debug!(scenario = %self.name, "expectation met");
        Ok(())
    }
}

fn incomplete(name: &str, description: &str, form: ProductForm) -> Scenario {
    Scenario::new(name, description, form, Expectation::required_fields())
}

/// The registration scenarios, TC001 through TC010
#[must_use]
pub fn catalog() -> Vec<Scenario> {
    vec![
        incomplete(
            "TC001_all_fields_empty",
            "Every field empty",
            ProductForm::new("", "", "", "", ""),
        ),
        incomplete(
            "TC002_only_code",
            "Only the code is filled",
            ProductForm::new("001", "", "", "", ""),
        ),
        incomplete(
            "TC003_only_name",
            "Only the name is filled",
            ProductForm::new("", "Teclado", "", "", ""),
        ),
        incomplete(
            "TC004_only_quantity",
            "Only the quantity is filled",
            ProductForm::new("", "", "100", "", ""),
        ),
        incomplete(
            "TC005_only_value",
            "Only the value is filled",
            ProductForm::new("", "", "", "250.00", ""),
        ),
        incomplete(
            "TC006_only_date",
            "Only the date is filled",
            ProductForm::new("", "", "", "", "2024-05-20"),
        ),
        incomplete(
            "TC007_without_code",
            "Everything but the code",
            ProductForm::new("", "Monitor LED", "30", "899.90", "2024-06-15"),
        ),
        incomplete(
            "TC008_without_name",
            "Everything but the name",
            ProductForm::new("005", "", "25", "450.00", "2024-07-10"),
        ),
        incomplete(
            "TC009_without_date",
            "Everything but the date",
            ProductForm::new("006", "Webcam HD", "40", "189.90", ""),
        ),
        Scenario::new(
            "TC010_all_fields_filled",
            "Complete registration is listed first in the table",
            ProductForm::new("007", "Mouse Gamer", "50", "150", "10-03-2024"),
            Expectation::RowListed {
                code: "007".to_string(),
                name: "Mouse Gamer".to_string(),
            },
        ),
    ]
}
