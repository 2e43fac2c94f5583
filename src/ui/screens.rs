use crate::models::{NearbyStore, Order, Product, QueryResult, Store};
use crate::workflows::{ReportKind, ReportQuery, UpdateKind};

use super::forms::{ChoiceEntry, ChoiceInput};

/// Everything a numbered menu entry can trigger.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum MenuAction {
    CreateUser,
    LogIn,
    Exit,
    ViewStores,
    ViewProducts,
    PlaceOrder,
    Report(ReportKind),
    UpdateProduct,
    SupplyRequest,
    LogOut,
}

#[derive(Clone, Debug)]
pub(crate) struct MenuEntry<A> {
    pub(crate) number: i64,
    pub(crate) label: &'static str,
    pub(crate) action: A,
}

const fn entry<A>(number: i64, label: &'static str, action: A) -> MenuEntry<A> {
    MenuEntry {
        number,
        label,
        action,
    }
}

/// A list of numbered choices. The user either types a number or moves the
/// highlight and presses Enter.
#[derive(Clone, Debug)]
pub(crate) struct Menu<A = MenuAction> {
    pub(crate) title: &'static str,
    pub(crate) entries: Vec<MenuEntry<A>>,
    pub(crate) selected: usize,
    pub(crate) input: ChoiceInput,
}

impl<A: Copy> Menu<A> {
    fn new(title: &'static str, entries: Vec<MenuEntry<A>>) -> Self {
        Self {
            title,
            entries,
            selected: 0,
            input: ChoiceInput::default(),
        }
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = step(self.selected, offset, self.entries.len());
    }

    /// Resolve the typed line (or the highlight) into an action. The error is
    /// the message to show the user.
    pub(crate) fn submit(&mut self) -> Result<A, &'static str> {
        match self.input.take() {
            ChoiceEntry::Highlighted => self
                .entries
                .get(self.selected)
                .map(|entry| entry.action)
                .ok_or("Unrecognized choice!"),
            ChoiceEntry::Number(number) => self
                .entries
                .iter()
                .position(|entry| entry.number == number)
                .map(|index| {
                    self.selected = index;
                    self.entries[index].action
                })
                .ok_or("Unrecognized choice!"),
            ChoiceEntry::Invalid => Err("Your input is invalid!"),
        }
    }
}

impl Menu {

    /// Shown while nobody is logged in.
    pub(crate) fn welcome() -> Self {
        Self::new(
            "MAIN MENU",
            vec![
                entry(1, "Create user", MenuAction::CreateUser),
                entry(2, "Log in", MenuAction::LogIn),
                entry(9, "< EXIT", MenuAction::Exit),
            ],
        )
    }

    /// Shown after login. Entries 5 onwards are manager/admin functions and
    /// re-check the role when chosen.
    pub(crate) fn home() -> Self {
        Self::new(
            "MAIN MENU",
            vec![
                entry(1, "View Stores within 30 miles", MenuAction::ViewStores),
                entry(2, "View Product List", MenuAction::ViewProducts),
                entry(3, "Place an Order", MenuAction::PlaceOrder),
                entry(
                    4,
                    "View 5 recent orders",
                    MenuAction::Report(ReportKind::MyRecentOrders),
                ),
                entry(5, "Update Product", MenuAction::UpdateProduct),
                entry(
                    6,
                    "View 5 recent Product Updates Info",
                    MenuAction::Report(ReportKind::RecentProductUpdates),
                ),
                entry(
                    7,
                    "View 5 Popular Items",
                    MenuAction::Report(ReportKind::PopularProducts),
                ),
                entry(
                    8,
                    "View 5 Popular Customers",
                    MenuAction::Report(ReportKind::PopularCustomers),
                ),
                entry(
                    9,
                    "Place Product Supply Request to Warehouse",
                    MenuAction::SupplyRequest,
                ),
                entry(
                    10,
                    "View 5 recent Store Orders",
                    MenuAction::Report(ReportKind::RecentStoreOrders),
                ),
                entry(
                    11,
                    "View 5 recent Supply Requests",
                    MenuAction::Report(ReportKind::SupplyRequests),
                ),
                entry(20, "Log out", MenuAction::LogOut),
            ],
        )
    }

}

impl Menu<UpdateKind> {
    /// Quantity, price, or both.
    pub(crate) fn update_kind() -> Self {
        Self::new(
            "What would you like to update?",
            vec![
                entry(1, "Number of units", UpdateKind::Quantity),
                entry(2, "Price per unit", UpdateKind::Price),
                entry(3, "Both", UpdateKind::Both),
            ],
        )
    }
}

/// Numbered rows chosen by position (1-based).
#[derive(Clone, Debug)]
pub(crate) struct Picker<T> {
    pub(crate) items: Vec<T>,
    pub(crate) selected: usize,
    pub(crate) input: ChoiceInput,
}

impl<T> Picker<T> {
    pub(crate) fn new(items: Vec<T>) -> Self {
        Self {
            items,
            selected: 0,
            input: ChoiceInput::default(),
        }
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = step(self.selected, offset, self.items.len());
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.items.len().saturating_sub(1);
    }

    /// Resolve the typed position (or the highlight) into an item index.
    pub(crate) fn submit(&mut self) -> Result<usize, String> {
        let len = self.items.len();
        if len == 0 {
            self.input.take();
            return Err("Nothing to select.".to_string());
        }
        match self.input.take() {
            ChoiceEntry::Highlighted => Ok(self.selected.min(len - 1)),
            ChoiceEntry::Number(n) if n >= 1 && (n as usize) <= len => {
                self.selected = n as usize - 1;
                Ok(self.selected)
            }
            ChoiceEntry::Number(_) => Err(format!("Please select a number between 1 and {len}.")),
            ChoiceEntry::Invalid => Err("Your input is invalid!".to_string()),
        }
    }

    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }
}

/// Clamp `current + offset` into `0..len`.
fn step(current: usize, offset: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let max = len as isize - 1;
    (current as isize + offset).clamp(0, max) as usize
}

/// Why the store list is open, which decides what picking a store does.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum StorePurpose {
    Browse,
    Order,
    UpdateProduct,
    Supply,
}

impl StorePurpose {
    pub(crate) fn title(self) -> &'static str {
        match self {
            StorePurpose::Browse => "Stores within 30 miles",
            StorePurpose::Order => "Place an Order: select a store",
            StorePurpose::UpdateProduct => "Update Product: select a store",
            StorePurpose::Supply => "Supply Request: select destination store",
        }
    }
}

/// A store line in the picker; distance is only known for the nearby list.
#[derive(Clone, Debug)]
pub(crate) struct StoreRow {
    pub(crate) store: Store,
    pub(crate) distance: Option<f64>,
}

impl From<NearbyStore> for StoreRow {
    fn from(nearby: NearbyStore) -> Self {
        Self {
            store: nearby.store,
            distance: Some(nearby.distance),
        }
    }
}

impl From<Store> for StoreRow {
    fn from(store: Store) -> Self {
        Self {
            store,
            distance: None,
        }
    }
}

impl StoreRow {
    pub(crate) fn cells(&self, position: usize) -> Vec<String> {
        vec![
            position.to_string(),
            self.store.id.to_string(),
            self.store.name.clone(),
            format!("{:.2}", self.store.latitude),
            format!("{:.2}", self.store.longitude),
            self.distance
                .map(|distance| format!("{distance:.2}"))
                .unwrap_or_default(),
        ]
    }
}

pub(crate) const STORE_HEADERS: [&str; 6] = ["#", "ID", "Store name", "Latitude", "Longitude", "Distance"];
pub(crate) const PRODUCT_HEADERS: [&str; 4] = ["#", "Product", "In stock", "Price"];

pub(crate) fn product_cells(product: &Product, position: usize) -> Vec<String> {
    vec![
        position.to_string(),
        product.name.clone(),
        product.units.to_string(),
        format!("${}", product.price_per_unit),
    ]
}

/// A table of results. Reports keep their query so they can be exported.
#[derive(Clone, Debug)]
pub(crate) struct ReportView {
    pub(crate) title: String,
    pub(crate) query: Option<ReportQuery>,
    pub(crate) result: QueryResult,
    pub(crate) selected: usize,
}

impl ReportView {
    pub(crate) fn from_query(query: ReportQuery, result: QueryResult) -> Self {
        Self {
            title: query.kind.title(),
            query: Some(query),
            result,
            selected: 0,
        }
    }

    /// One-row receipt shown after an order commits.
    pub(crate) fn order_confirmation(order: &Order, store: &Store) -> Self {
        let result = QueryResult {
            columns: [
                "orderNumber",
                "customerID",
                "storeName",
                "productName",
                "unitsOrdered",
                "orderTime",
            ]
            .iter()
            .map(|column| column.to_string())
            .collect(),
            rows: vec![vec![
                order.number.to_string(),
                order.customer_id.to_string(),
                store.name.clone(),
                order.product_name.clone(),
                order.units_ordered.to_string(),
                order.order_time.clone(),
            ]],
        };
        Self {
            title: "=====Order Confirmation=====".to_string(),
            query: None,
            result,
            selected: 0,
        }
    }

    /// Generic key/value summary used after updates and supply requests.
    pub(crate) fn summary(title: &str, columns: &[&str], values: Vec<String>) -> Self {
        Self {
            title: title.to_string(),
            query: None,
            result: QueryResult {
                columns: columns.iter().map(|column| column.to_string()).collect(),
                rows: vec![values],
            },
            selected: 0,
        }
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = step(self.selected, offset, self.result.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_into(input: &mut ChoiceInput, text: &str) {
        for ch in text.chars() {
            input.push_char(ch);
        }
    }

    #[test]
    fn typed_numbers_pick_menu_entries_by_number() {
        let mut menu = Menu::home();
        type_into(&mut menu.input, "20");
        assert_eq!(menu.submit(), Ok(MenuAction::LogOut));

        type_into(&mut menu.input, "13");
        assert_eq!(menu.submit(), Err("Unrecognized choice!"));

        type_into(&mut menu.input, "abc");
        assert_eq!(menu.submit(), Err("Your input is invalid!"));
    }

    #[test]
    fn enter_without_input_uses_the_highlight() {
        let mut menu = Menu::welcome();
        menu.move_selection(1);
        assert_eq!(menu.submit(), Ok(MenuAction::LogIn));
        menu.move_selection(10);
        assert_eq!(menu.submit(), Ok(MenuAction::Exit));
    }

    #[test]
    fn update_menu_yields_update_kinds() {
        let mut menu = Menu::update_kind();
        type_into(&mut menu.input, "3");
        assert_eq!(menu.submit(), Ok(UpdateKind::Both));
        type_into(&mut menu.input, "4");
        assert_eq!(menu.submit(), Err("Unrecognized choice!"));
    }

    #[test]
    fn picker_positions_are_one_based() {
        let mut picker = Picker::new(vec!["a", "b", "c"]);
        type_into(&mut picker.input, "3");
        assert_eq!(picker.submit(), Ok(2));
        assert_eq!(picker.get(2), Some(&"c"));

        type_into(&mut picker.input, "0");
        assert!(picker.submit().is_err());
        type_into(&mut picker.input, "4");
        assert!(picker.submit().is_err());
    }

    #[test]
    fn empty_picker_cannot_submit() {
        let mut picker: Picker<&str> = Picker::new(Vec::new());
        assert!(picker.submit().is_err());
        picker.move_selection(3);
        assert_eq!(picker.selected, 0);
    }

    #[test]
    fn step_clamps_to_bounds() {
        assert_eq!(step(0, -1, 4), 0);
        assert_eq!(step(2, 5, 4), 3);
        assert_eq!(step(1, 1, 4), 2);
    }
}
