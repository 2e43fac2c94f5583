use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Product, Store};
use crate::workflows::{OrderRequest, ProductChange, SupplyDraft, UpdateKind};

/// Input rules for a single form field.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum FieldKind {
    Text,
    /// Rendered as asterisks.
    Secret,
    /// Whole numbers, optionally negative.
    Integer,
    /// Numbers with an optional fraction, optionally negative.
    Decimal,
}

impl FieldKind {
    fn accepts(self, current: &str, ch: char) -> bool {
        match self {
            FieldKind::Text | FieldKind::Secret => !ch.is_control(),
            FieldKind::Integer => ch.is_ascii_digit() || (ch == '-' && current.is_empty()),
            FieldKind::Decimal => {
                ch.is_ascii_digit()
                    || (ch == '-' && current.is_empty())
                    || (ch == '.' && !current.contains('.'))
            }
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct FormField {
    pub(crate) label: &'static str,
    pub(crate) value: String,
    pub(crate) kind: FieldKind,
}

/// A popup with one or more labelled input lines. Tab cycles the focus, Enter
/// submits, Esc cancels.
#[derive(Clone, Debug)]
pub(crate) struct InputForm {
    pub(crate) title: String,
    pub(crate) fields: Vec<FormField>,
    pub(crate) active: usize,
    pub(crate) error: Option<String>,
}

impl InputForm {
    pub(crate) fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            fields: Vec::new(),
            active: 0,
            error: None,
        }
    }

    pub(crate) fn field(mut self, label: &'static str, kind: FieldKind) -> Self {
        self.fields.push(FormField {
            label,
            value: String::new(),
            kind,
        });
        self
    }

    /// Signup: name, password and home coordinates.
    pub(crate) fn sign_up() -> Self {
        Self::new("Create User")
            .field("Name", FieldKind::Text)
            .field("Password", FieldKind::Secret)
            .field("Latitude", FieldKind::Decimal)
            .field("Longitude", FieldKind::Decimal)
    }

    pub(crate) fn log_in() -> Self {
        Self::new("Log In")
            .field("Name", FieldKind::Text)
            .field("Password", FieldKind::Secret)
    }

    pub(crate) fn store_id() -> Self {
        Self::new("View Product List").field("Store ID", FieldKind::Integer)
    }

    pub(crate) fn quantity(product: &Product) -> Self {
        Self::new(format!(
            "Order {} (price: ${}, in stock: {})",
            product.name, product.price_per_unit, product.units
        ))
        .field("Quantity", FieldKind::Integer)
    }

    pub(crate) fn supply(product: &Product) -> Self {
        Self::new(format!("Supply Request for {}", product.name))
            .field("Units", FieldKind::Integer)
            .field("Warehouse ID", FieldKind::Integer)
    }

    /// One field per value being changed, quantity first.
    pub(crate) fn product_update(kind: UpdateKind, product: &Product) -> Self {
        let mut form = Self::new(format!(
            "Update {} (units: {}, price: ${})",
            product.name, product.units, product.price_per_unit
        ));
        if kind.touches_quantity() {
            form = form.field("New number of units", FieldKind::Integer);
        }
        if kind.touches_price() {
            form = form.field("New price per unit", FieldKind::Integer);
        }
        form
    }

    /// Read the fields built by [`InputForm::product_update`].
    pub(crate) fn product_change(&self, kind: UpdateKind, product: &Product) -> Result<ProductChange> {
        let units = if kind.touches_quantity() {
            Some(self.integer(0)?)
        } else {
            None
        };
        let price_index = usize::from(kind.touches_quantity());
        let price_per_unit = if kind.touches_price() {
            Some(self.integer(price_index)?)
        } else {
            None
        };
        if units.is_some_and(|units| units < 0) {
            return Err(anyhow!("Number of units cannot be negative."));
        }
        if price_per_unit.is_some_and(|price| price < 0) {
            return Err(anyhow!("Price cannot be negative."));
        }

        Ok(ProductChange {
            store_id: product.store_id,
            product_name: product.name.clone(),
            units,
            price_per_unit,
        })
    }

    /// Read the fields built by [`InputForm::supply`].
    pub(crate) fn supply_draft(&self, product: &Product) -> Result<SupplyDraft> {
        let units = self.integer(0)?;
        if units < 1 {
            return Err(anyhow!("Units must be at least 1."));
        }
        let warehouse_id = self.integer(1)?;
        if warehouse_id < 1 {
            return Err(anyhow!("Warehouse ID must be a positive number."));
        }

        Ok(SupplyDraft {
            store_id: product.store_id,
            product_name: product.name.clone(),
            units,
            warehouse_id,
        })
    }

    pub(crate) fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.active = (self.active + 1) % self.fields.len();
        }
    }

    pub(crate) fn previous_field(&mut self) {
        if !self.fields.is_empty() {
            self.active = (self.active + self.fields.len() - 1) % self.fields.len();
        }
    }

    /// Append a character to the active field, validating allowed input.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        match self.fields.get_mut(self.active) {
            Some(field) if field.kind.accepts(&field.value, ch) => {
                field.value.push(ch);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.active) {
            field.value.pop();
        }
    }

    pub(crate) fn value(&self, index: usize) -> &str {
        self.fields
            .get(index)
            .map(|field| field.value.as_str())
            .unwrap_or("")
    }

    /// Parse a field as a whole number, naming the field in the error.
    pub(crate) fn integer(&self, index: usize) -> Result<i64> {
        let label = self.fields.get(index).map(|f| f.label).unwrap_or("Value");
        let raw = self.value(index).trim();
        if raw.is_empty() {
            return Err(anyhow!("{label} is required."));
        }
        raw.parse::<i64>()
            .map_err(|_| anyhow!("{label} must be a whole number."))
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, index: usize) -> Line<'static> {
        let Some(field) = self.fields.get(index) else {
            return Line::from("");
        };
        let is_active = index == self.active;

        let display = if field.value.is_empty() {
            "<required>".to_string()
        } else if field.kind == FieldKind::Secret {
            "*".repeat(field.value.chars().count())
        } else {
            field.value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if field.value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label)),
            Span::styled(display, style),
        ])
    }

    /// Cursor column offset for the active field: label, separator, value.
    pub(crate) fn cursor_offset(&self) -> usize {
        self.fields
            .get(self.active)
            .map(|field| field.label.len() + 2 + field.value.chars().count())
            .unwrap_or(0)
    }
}

/// What a typed menu line resolved to.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ChoiceEntry {
    /// Nothing typed: use the highlighted row.
    Highlighted,
    Number(i64),
    Invalid,
}

/// The "Please make your choice:" line under every menu and picker.
#[derive(Default, Clone, Debug)]
pub(crate) struct ChoiceInput {
    pub(crate) buffer: String,
}

impl ChoiceInput {
    pub(crate) fn push_char(&mut self, ch: char) {
        if !ch.is_control() {
            self.buffer.push(ch);
        }
    }

    pub(crate) fn backspace(&mut self) {
        self.buffer.pop();
    }

    /// Consume the buffer and classify it.
    pub(crate) fn take(&mut self) -> ChoiceEntry {
        let raw = std::mem::take(&mut self.buffer);
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            ChoiceEntry::Highlighted
        } else {
            trimmed
                .parse::<i64>()
                .map(ChoiceEntry::Number)
                .unwrap_or(ChoiceEntry::Invalid)
        }
    }
}

/// Step waiting on a yes/no answer.
#[derive(Clone, Debug)]
pub(crate) enum PendingAction {
    PlaceOrder { store: Store, request: OrderRequest },
    AnotherOrder { store: Store },
    UpdateProduct { store: Store, change: ProductChange },
    Supply { store: Store, draft: SupplyDraft },
}

/// A "1. Yes / 2. No" popup.
#[derive(Clone, Debug)]
pub(crate) struct ConfirmDialog {
    pub(crate) title: String,
    pub(crate) lines: Vec<String>,
    pub(crate) action: PendingAction,
}

impl ConfirmDialog {
    pub(crate) fn place_order(store: Store, product: &Product, units: i64) -> Self {
        let lines = vec![
            "Please confirm order:".to_string(),
            format!("    Store: {}", store.name),
            format!("    Item: {}", product.name),
            format!("    Quantity: {units}"),
            format!("    Total: ${}", product.price_per_unit * units),
        ];
        let request = OrderRequest {
            store_id: store.id,
            product_name: product.name.clone(),
            units,
        };
        Self {
            title: "Place order?".to_string(),
            lines,
            action: PendingAction::PlaceOrder { store, request },
        }
    }

    pub(crate) fn another_order(store: Store) -> Self {
        Self {
            title: "Place another order from this store?".to_string(),
            lines: vec![format!("Your current store: {}", store.name)],
            action: PendingAction::AnotherOrder { store },
        }
    }

    pub(crate) fn update_product(store: Store, before: &Product, change: ProductChange) -> Self {
        let after = change.apply_to(before);
        let lines = vec![
            format!("{} at {}", before.name, store.name),
            format!("    Units: {} -> {}", before.units, after.units),
            format!("    Price: ${} -> ${}", before.price_per_unit, after.price_per_unit),
        ];
        Self {
            title: "Apply product update?".to_string(),
            lines,
            action: PendingAction::UpdateProduct { store, change },
        }
    }

    pub(crate) fn supply(store: Store, product: &Product, draft: SupplyDraft) -> Self {
        let lines = vec![
            format!("{} at {}", product.name, store.name),
            format!("    Units requested: {}", draft.units),
            format!("    Stock after delivery: {}", product.units + draft.units),
            format!("    Warehouse: {}", draft.warehouse_id),
        ];
        Self {
            title: "Send supply request?".to_string(),
            lines,
            action: PendingAction::Supply { store, draft },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_fields_reject_letters() {
        let mut form = InputForm::store_id();
        assert!(form.push_char('4'));
        assert!(!form.push_char('x'));
        assert!(!form.push_char('-'));
        assert_eq!(form.value(0), "4");
        assert_eq!(form.integer(0).ok(), Some(4));
    }

    #[test]
    fn decimal_fields_allow_one_point() {
        let mut form = InputForm::sign_up();
        form.active = 2;
        for ch in "-12.5.".chars() {
            form.push_char(ch);
        }
        assert_eq!(form.value(2), "-12.5");
    }

    #[test]
    fn empty_integer_field_names_itself() {
        let form = InputForm::store_id();
        let message = form.integer(0).err().map(|err| err.to_string());
        assert_eq!(message.as_deref(), Some("Store ID is required."));
    }

    #[test]
    fn field_focus_wraps() {
        let mut form = InputForm::log_in();
        form.next_field();
        assert_eq!(form.active, 1);
        form.next_field();
        assert_eq!(form.active, 0);
        form.previous_field();
        assert_eq!(form.active, 1);
    }

    #[test]
    fn secret_values_are_masked() {
        let mut form = InputForm::log_in();
        form.active = 1;
        for ch in "hunter2".chars() {
            form.push_char(ch);
        }
        let rendered: String = form
            .build_line(1)
            .spans
            .iter()
            .map(|span| span.content.to_string())
            .collect();
        assert_eq!(rendered, "Password: *******");
    }

    fn milk() -> Product {
        Product {
            store_id: 3,
            name: "Milk".to_string(),
            units: 12,
            price_per_unit: 2,
        }
    }

    fn fill(form: &mut InputForm, values: &[&str]) {
        for (index, value) in values.iter().enumerate() {
            form.active = index;
            for ch in value.chars() {
                form.push_char(ch);
            }
        }
    }

    #[test]
    fn price_only_update_keeps_units() -> anyhow::Result<()> {
        let mut form = InputForm::product_update(UpdateKind::Price, &milk());
        assert_eq!(form.fields.len(), 1);
        fill(&mut form, &["5"]);

        let change = form.product_change(UpdateKind::Price, &milk())?;
        assert_eq!(change.units, None);
        assert_eq!(change.price_per_unit, Some(5));
        assert_eq!(change.store_id, 3);
        Ok(())
    }

    #[test]
    fn both_update_reads_two_fields() -> anyhow::Result<()> {
        let mut form = InputForm::product_update(UpdateKind::Both, &milk());
        fill(&mut form, &["40", "3"]);

        let change = form.product_change(UpdateKind::Both, &milk())?;
        assert_eq!(change.units, Some(40));
        assert_eq!(change.price_per_unit, Some(3));
        Ok(())
    }

    #[test]
    fn negative_units_are_rejected() {
        let mut form = InputForm::product_update(UpdateKind::Quantity, &milk());
        fill(&mut form, &["-4"]);
        let message = form
            .product_change(UpdateKind::Quantity, &milk())
            .err()
            .map(|err| err.to_string());
        assert_eq!(message.as_deref(), Some("Number of units cannot be negative."));
    }

    #[test]
    fn supply_needs_positive_units() {
        let mut form = InputForm::supply(&milk());
        fill(&mut form, &["0", "7"]);
        assert!(form.supply_draft(&milk()).is_err());

        let mut form = InputForm::supply(&milk());
        fill(&mut form, &["10", "7"]);
        let draft = form.supply_draft(&milk()).ok();
        assert_eq!(draft.map(|draft| (draft.units, draft.warehouse_id)), Some((10, 7)));
    }

    #[test]
    fn choice_input_classifies_entries() {
        let mut input = ChoiceInput::default();
        assert_eq!(input.take(), ChoiceEntry::Highlighted);

        for ch in " 20 ".chars() {
            input.push_char(ch);
        }
        assert_eq!(input.take(), ChoiceEntry::Number(20));
        assert!(input.buffer.is_empty());

        input.push_char('a');
        assert_eq!(input.take(), ChoiceEntry::Invalid);
    }
}
