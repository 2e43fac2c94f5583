use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use log::{error, info, warn};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState,
    Wrap,
};
use ratatui::Frame;
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::error::RetailError;
use crate::models::{Order, Product, Session, Store};
use crate::nearby::NEARBY_RADIUS;
use crate::workflows::{
    check_quantity, create_user, export_report, log_in, nearby_stores, parse_new_user,
    place_order, prepare_report, request_supply, store_products, update_product, visible_stores,
    OrderRequest, ProductChange, ReportKind, SupplyDraft, UpdateKind,
};

use super::forms::{ConfirmDialog, InputForm, PendingAction};
use super::helpers::{centered_rect, is_user_error, key_hints, surface_error};
use super::screens::{
    product_cells, Menu, MenuAction, Picker, ReportView, StorePurpose, StoreRow,
    PRODUCT_HEADERS, STORE_HEADERS,
};

/// Connection banner above the content.
const HEADER_HEIGHT: u16 = 4;
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows skipped by PageUp/PageDown.
const PAGE: isize = 5;

/// What fills the main area.
enum Screen {
    /// Main menu before login.
    Welcome(Menu),
    /// Main menu after login.
    Home(Menu),
    Stores {
        purpose: StorePurpose,
        picker: Picker<StoreRow>,
    },
    Products {
        purpose: StorePurpose,
        store: Store,
        picker: Picker<Product>,
    },
    Report(ReportView),
}

/// Popups layered over the current screen.
enum Mode {
    Normal,
    SignUp(InputForm),
    LogIn(InputForm),
    StoreIdPrompt(InputForm),
    Quantity {
        store: Store,
        product: Product,
        form: InputForm,
    },
    ChooseUpdate {
        store: Store,
        product: Product,
        menu: Menu<UpdateKind>,
    },
    EditProduct {
        store: Store,
        product: Product,
        kind: UpdateKind,
        form: InputForm,
    },
    SupplyForm {
        store: Store,
        product: Product,
        form: InputForm,
    },
    Confirm(ConfirmDialog),
}

/// Outcome of a key press on the current screen, applied once the screen
/// borrow has ended.
enum Command {
    None,
    Quit,
    Back,
    Export,
    Invalid(String),
    Menu(MenuAction),
    PickStore(StorePurpose, Store),
    PickProduct(StorePurpose, Store, Product),
}

/// How a key press changed a form.
enum FormKey {
    Edited,
    Submit,
    Cancel,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state: the open connection, the logged-in session and
/// whatever the user is looking at.
pub struct App {
    conn: Connection,
    config: AppConfig,
    session: Option<Session>,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(conn: Connection, config: AppConfig) -> Self {
        Self {
            conn,
            config,
            session: None,
            screen: Screen::Welcome(Menu::welcome()),
            mode: Mode::Normal,
            status: None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Hand the connection back so the caller can close it.
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mut mode = mem::replace(&mut self.mode, Mode::Normal);

        mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::SignUp(form) => self.handle_sign_up(code, form)?,
            Mode::LogIn(form) => self.handle_log_in(code, form)?,
            Mode::StoreIdPrompt(form) => self.handle_store_id(code, form)?,
            Mode::Quantity {
                store,
                product,
                form,
            } => self.handle_quantity(code, store, product, form)?,
            Mode::ChooseUpdate {
                store,
                product,
                menu,
            } => self.handle_choose_update(code, store, product, menu)?,
            Mode::EditProduct {
                store,
                product,
                kind,
                form,
            } => self.handle_edit_product(code, store, product, kind, form)?,
            Mode::SupplyForm {
                store,
                product,
                form,
            } => self.handle_supply_form(code, store, product, form)?,
            Mode::Confirm(dialog) => self.handle_confirm(code, dialog)?,
        };

        self.mode = mode;
        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        let command = match &mut self.screen {
            Screen::Welcome(menu) | Screen::Home(menu) => menu_command(menu, code),
            Screen::Stores { purpose, picker } => {
                let purpose = *purpose;
                picker_command(picker, code, |row| {
                    Command::PickStore(purpose, row.store.clone())
                })
            }
            Screen::Products {
                purpose,
                store,
                picker,
            } => {
                let purpose = *purpose;
                let store = store.clone();
                picker_command(picker, code, |product| {
                    Command::PickProduct(purpose, store, product.clone())
                })
            }
            Screen::Report(view) => match code {
                KeyCode::Char('q') => Command::Quit,
                KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace => Command::Back,
                KeyCode::Char('x') | KeyCode::Char('X') => Command::Export,
                KeyCode::Up => {
                    view.move_selection(-1);
                    Command::None
                }
                KeyCode::Down => {
                    view.move_selection(1);
                    Command::None
                }
                KeyCode::PageUp => {
                    view.move_selection(-PAGE);
                    Command::None
                }
                KeyCode::PageDown => {
                    view.move_selection(PAGE);
                    Command::None
                }
                _ => Command::None,
            },
        };

        match command {
            Command::None => {}
            Command::Quit => *exit = true,
            Command::Back => self.go_back(),
            Command::Export => self.export_current(),
            Command::Invalid(message) => self.set_status(message, StatusKind::Error),
            Command::Menu(action) => return self.run_menu_action(action, exit),
            Command::PickStore(purpose, store) => self.pick_store(purpose, store),
            Command::PickProduct(purpose, store, product) => {
                return Ok(self.pick_product(purpose, store, product))
            }
        }
        Ok(Mode::Normal)
    }

    fn run_menu_action(&mut self, action: MenuAction, exit: &mut bool) -> Result<Mode> {
        self.clear_status();
        let outcome = match action {
            MenuAction::CreateUser => return Ok(Mode::SignUp(InputForm::sign_up())),
            MenuAction::LogIn => return Ok(Mode::LogIn(InputForm::log_in())),
            MenuAction::ViewProducts => return Ok(Mode::StoreIdPrompt(InputForm::store_id())),
            MenuAction::Exit => {
                *exit = true;
                Ok(())
            }
            MenuAction::LogOut => {
                self.log_out();
                Ok(())
            }
            MenuAction::ViewStores => self.open_nearby(StorePurpose::Browse),
            MenuAction::PlaceOrder => self.open_nearby(StorePurpose::Order),
            MenuAction::UpdateProduct => self.open_visible(StorePurpose::UpdateProduct),
            MenuAction::SupplyRequest => self.open_visible(StorePurpose::Supply),
            MenuAction::Report(kind) => self.open_report(kind),
        };
        self.attempt(outcome);
        Ok(Mode::Normal)
    }

    fn handle_sign_up(&mut self, code: KeyCode, mut form: InputForm) -> Result<Mode> {
        match edit_form(&mut form, code) {
            FormKey::Edited => Ok(Mode::SignUp(form)),
            FormKey::Cancel => {
                self.set_status("Create user cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            FormKey::Submit => {
                let created = parse_new_user(form.value(0), form.value(1), form.value(2), form.value(3))
                    .map_err(anyhow::Error::from)
                    .and_then(|new_user| create_user(&self.conn, &new_user));
                match created {
                    Ok(user) => {
                        self.set_status(
                            format!("User {} successfully created!", user.name),
                            StatusKind::Info,
                        );
                        Ok(Mode::Normal)
                    }
                    Err(err) => {
                        form.error = Some(self.note_error(&err));
                        Ok(Mode::SignUp(form))
                    }
                }
            }
        }
    }

    fn handle_log_in(&mut self, code: KeyCode, mut form: InputForm) -> Result<Mode> {
        match edit_form(&mut form, code) {
            FormKey::Edited => Ok(Mode::LogIn(form)),
            FormKey::Cancel => {
                self.set_status("Log in cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            FormKey::Submit => match log_in(&self.conn, form.value(0), form.value(1)) {
                Ok(session) => {
                    self.set_status(
                        format!("Welcome, {}!", session.user.name),
                        StatusKind::Info,
                    );
                    self.session = Some(session);
                    self.screen = Screen::Home(Menu::home());
                    Ok(Mode::Normal)
                }
                Err(err) => {
                    form.error = Some(self.note_error(&err));
                    Ok(Mode::LogIn(form))
                }
            },
        }
    }

    fn handle_store_id(&mut self, code: KeyCode, mut form: InputForm) -> Result<Mode> {
        match edit_form(&mut form, code) {
            FormKey::Edited => Ok(Mode::StoreIdPrompt(form)),
            FormKey::Cancel => Ok(Mode::Normal),
            FormKey::Submit => {
                let opened = form
                    .integer(0)
                    .and_then(|store_id| self.open_report(ReportKind::StoreProducts(store_id)));
                match opened {
                    Ok(()) => Ok(Mode::Normal),
                    Err(err) => {
                        form.error = Some(self.note_error(&err));
                        Ok(Mode::StoreIdPrompt(form))
                    }
                }
            }
        }
    }

    fn handle_quantity(
        &mut self,
        code: KeyCode,
        store: Store,
        product: Product,
        mut form: InputForm,
    ) -> Result<Mode> {
        match edit_form(&mut form, code) {
            FormKey::Edited => Ok(Mode::Quantity {
                store,
                product,
                form,
            }),
            FormKey::Cancel => {
                self.set_status("Order cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            FormKey::Submit => {
                let checked = form.integer(0).and_then(|units| {
                    check_quantity(&product, units)?;
                    Ok(units)
                });
                match checked {
                    Ok(units) => Ok(Mode::Confirm(ConfirmDialog::place_order(
                        store, &product, units,
                    ))),
                    Err(err) => {
                        form.error = Some(surface_error(&err));
                        Ok(Mode::Quantity {
                            store,
                            product,
                            form,
                        })
                    }
                }
            }
        }
    }

    fn handle_choose_update(
        &mut self,
        code: KeyCode,
        store: Store,
        product: Product,
        mut menu: Menu<UpdateKind>,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Update cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Up => menu.move_selection(-1),
            KeyCode::Down => menu.move_selection(1),
            KeyCode::Backspace => menu.input.backspace(),
            KeyCode::Char(ch) => menu.input.push_char(ch),
            KeyCode::Enter => match menu.submit() {
                Ok(kind) => {
                    self.clear_status();
                    return Ok(Mode::EditProduct {
                        form: InputForm::product_update(kind, &product),
                        store,
                        product,
                        kind,
                    });
                }
                Err(message) => self.set_status(message, StatusKind::Error),
            },
            _ => {}
        }
        Ok(Mode::ChooseUpdate {
            store,
            product,
            menu,
        })
    }

    fn handle_edit_product(
        &mut self,
        code: KeyCode,
        store: Store,
        product: Product,
        kind: UpdateKind,
        mut form: InputForm,
    ) -> Result<Mode> {
        match edit_form(&mut form, code) {
            FormKey::Edited => Ok(Mode::EditProduct {
                store,
                product,
                kind,
                form,
            }),
            FormKey::Cancel => {
                self.set_status("Update cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            FormKey::Submit => match form.product_change(kind, &product) {
                Ok(change) => Ok(Mode::Confirm(ConfirmDialog::update_product(
                    store, &product, change,
                ))),
                Err(err) => {
                    form.error = Some(surface_error(&err));
                    Ok(Mode::EditProduct {
                        store,
                        product,
                        kind,
                        form,
                    })
                }
            },
        }
    }

    fn handle_supply_form(
        &mut self,
        code: KeyCode,
        store: Store,
        product: Product,
        mut form: InputForm,
    ) -> Result<Mode> {
        match edit_form(&mut form, code) {
            FormKey::Edited => Ok(Mode::SupplyForm {
                store,
                product,
                form,
            }),
            FormKey::Cancel => {
                self.set_status("Supply request cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            FormKey::Submit => match form.supply_draft(&product) {
                Ok(draft) => Ok(Mode::Confirm(ConfirmDialog::supply(store, &product, draft))),
                Err(err) => {
                    form.error = Some(surface_error(&err));
                    Ok(Mode::SupplyForm {
                        store,
                        product,
                        form,
                    })
                }
            },
        }
    }

    fn handle_confirm(&mut self, code: KeyCode, dialog: ConfirmDialog) -> Result<Mode> {
        match code {
            KeyCode::Char('1') | KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                Ok(self.accept(dialog.action))
            }
            KeyCode::Char('2') | KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.decline(dialog.action);
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::Confirm(dialog)),
        }
    }

    fn accept(&mut self, action: PendingAction) -> Mode {
        match action {
            PendingAction::PlaceOrder { store, request } => match self.commit_order(&request) {
                Ok(order) => {
                    self.screen = Screen::Report(ReportView::order_confirmation(&order, &store));
                    self.set_status(
                        format!("Order #{} placed.", order.number),
                        StatusKind::Info,
                    );
                    Mode::Confirm(ConfirmDialog::another_order(store))
                }
                Err(err) => {
                    let reopened = self.open_products(StorePurpose::Order, store.id);
                    self.attempt(reopened);
                    self.fail(&err);
                    Mode::Normal
                }
            },
            PendingAction::AnotherOrder { store } => {
                let reopened = self.open_products(StorePurpose::Order, store.id);
                self.attempt(reopened);
                Mode::Normal
            }
            PendingAction::UpdateProduct { store, change } => {
                match self.commit_update(&store, &change) {
                    Ok(view) => {
                        self.screen = Screen::Report(view);
                        self.set_status("Product updated.", StatusKind::Info);
                    }
                    Err(err) => self.fail(&err),
                }
                Mode::Normal
            }
            PendingAction::Supply { store, draft } => {
                match self.commit_supply(&store, &draft) {
                    Ok(view) => {
                        self.screen = Screen::Report(view);
                        self.set_status("Supply request placed.", StatusKind::Info);
                    }
                    Err(err) => self.fail(&err),
                }
                Mode::Normal
            }
        }
    }

    fn decline(&mut self, action: PendingAction) {
        match action {
            PendingAction::PlaceOrder { .. } => {
                self.set_status("Order cancelled.", StatusKind::Info);
            }
            PendingAction::AnotherOrder { .. } => {
                self.clear_status();
                self.go_home();
            }
            PendingAction::UpdateProduct { .. } => {
                self.set_status("Update cancelled.", StatusKind::Info);
            }
            PendingAction::Supply { .. } => {
                self.set_status("Supply request cancelled.", StatusKind::Info);
            }
        }
    }

    fn commit_order(&mut self, request: &OrderRequest) -> Result<Order> {
        let session = self.require_session()?;
        place_order(&mut self.conn, &session, request)
    }

    fn commit_update(&mut self, store: &Store, change: &ProductChange) -> Result<ReportView> {
        let session = self.require_session()?;
        let outcome = update_product(&mut self.conn, &session, change)?;
        let audit = outcome
            .audit
            .map(|audit| audit.number.to_string())
            .unwrap_or_default();
        Ok(ReportView::summary(
            "=====Product Updated=====",
            &[
                "storeName",
                "productName",
                "unitsBefore",
                "unitsAfter",
                "priceBefore",
                "priceAfter",
                "updateNumber",
            ],
            vec![
                store.name.clone(),
                outcome.after.name.clone(),
                outcome.before.units.to_string(),
                outcome.after.units.to_string(),
                outcome.before.price_per_unit.to_string(),
                outcome.after.price_per_unit.to_string(),
                audit,
            ],
        ))
    }

    fn commit_supply(&mut self, store: &Store, draft: &SupplyDraft) -> Result<ReportView> {
        let session = self.require_session()?;
        let request = request_supply(&mut self.conn, &session, draft)?;
        Ok(ReportView::summary(
            "=====Supply Request=====",
            &[
                "requestNumber",
                "managerID",
                "warehouseID",
                "storeName",
                "productName",
                "unitsRequested",
            ],
            vec![
                request.number.to_string(),
                request.manager_id.to_string(),
                request.warehouse_id.to_string(),
                store.name.clone(),
                request.product_name,
                request.units_requested.to_string(),
            ],
        ))
    }

    fn pick_store(&mut self, purpose: StorePurpose, store: Store) {
        self.clear_status();
        let outcome = match purpose {
            StorePurpose::Browse => self.open_report(ReportKind::StoreProducts(store.id)),
            _ => self.open_products(purpose, store.id),
        };
        self.attempt(outcome);
    }

    fn pick_product(&mut self, purpose: StorePurpose, store: Store, product: Product) -> Mode {
        self.clear_status();
        match purpose {
            StorePurpose::Browse => Mode::Normal,
            StorePurpose::Order => Mode::Quantity {
                form: InputForm::quantity(&product),
                store,
                product,
            },
            StorePurpose::UpdateProduct => Mode::ChooseUpdate {
                store,
                product,
                menu: Menu::update_kind(),
            },
            StorePurpose::Supply => Mode::SupplyForm {
                form: InputForm::supply(&product),
                store,
                product,
            },
        }
    }

    fn open_nearby(&mut self, purpose: StorePurpose) -> Result<()> {
        let session = self.require_session()?;
        let stores = nearby_stores(&self.conn, &session)?;
        if stores.is_empty() {
            self.set_status(
                format!("No stores within {NEARBY_RADIUS} miles of your location."),
                StatusKind::Info,
            );
        }
        self.screen = Screen::Stores {
            purpose,
            picker: Picker::new(stores.into_iter().map(StoreRow::from).collect()),
        };
        Ok(())
    }

    fn open_visible(&mut self, purpose: StorePurpose) -> Result<()> {
        let session = self.require_session()?;
        let stores = visible_stores(&self.conn, &session)?;
        if stores.is_empty() {
            self.set_status("You do not manage any stores.", StatusKind::Info);
        }
        self.screen = Screen::Stores {
            purpose,
            picker: Picker::new(stores.into_iter().map(StoreRow::from).collect()),
        };
        Ok(())
    }

    fn open_products(&mut self, purpose: StorePurpose, store_id: i64) -> Result<()> {
        let (store, products) = store_products(&self.conn, store_id)?;
        if products.is_empty() {
            self.set_status(format!("{} has no products.", store.name), StatusKind::Info);
        }
        self.screen = Screen::Products {
            purpose,
            store,
            picker: Picker::new(products),
        };
        Ok(())
    }

    fn open_report(&mut self, kind: ReportKind) -> Result<()> {
        let session = self.require_session()?;
        let query = prepare_report(&self.conn, &session, kind)?;
        let result = query.run(&self.conn)?;
        if result.is_empty() {
            self.set_status("No rows to display.", StatusKind::Info);
        }
        self.screen = Screen::Report(ReportView::from_query(query, result));
        Ok(())
    }

    fn export_current(&mut self) {
        let query = match &self.screen {
            Screen::Report(ReportView {
                query: Some(query), ..
            }) => query.clone(),
            Screen::Report(_) => {
                self.set_status("Only reports can be exported.", StatusKind::Error);
                return;
            }
            _ => return,
        };
        match export_report(&self.conn, &query, &self.config.export_dir()) {
            Ok((path, rows)) => self.set_status(
                format!("Exported {rows} row(s) to {}", path.display()),
                StatusKind::Info,
            ),
            Err(err) => self.fail(&err),
        }
    }

    fn go_back(&mut self) {
        let purpose = match &self.screen {
            Screen::Welcome(_) | Screen::Home(_) => return,
            Screen::Stores { .. } | Screen::Report(_) => {
                self.clear_status();
                self.go_home();
                return;
            }
            Screen::Products { purpose, .. } => *purpose,
        };
        self.clear_status();
        let reopened = match purpose {
            StorePurpose::Browse | StorePurpose::Order => self.open_nearby(purpose),
            StorePurpose::UpdateProduct | StorePurpose::Supply => self.open_visible(purpose),
        };
        if let Err(err) = reopened {
            self.go_home();
            self.fail(&err);
        }
    }

    fn go_home(&mut self) {
        self.screen = if self.session.is_some() {
            Screen::Home(Menu::home())
        } else {
            Screen::Welcome(Menu::welcome())
        };
    }

    fn log_out(&mut self) {
        if let Some(session) = self.session.take() {
            info!("user #{} ({}) logged out", session.user_id(), session.user.name);
        }
        self.screen = Screen::Welcome(Menu::welcome());
        self.set_status("Logged out.", StatusKind::Info);
    }

    fn require_session(&self) -> Result<Session> {
        self.session
            .clone()
            .ok_or_else(|| RetailError::NotLoggedIn.into())
    }

    fn attempt(&mut self, outcome: Result<()>) {
        if let Err(err) = outcome {
            self.fail(&err);
        }
    }

    /// Log an error and return the text to show for it.
    fn note_error(&self, err: &anyhow::Error) -> String {
        if is_user_error(err) {
            warn!("{err:#}");
        } else {
            error!("{err:#}");
        }
        surface_error(err)
    }

    fn fail(&mut self, err: &anyhow::Error) {
        let message = self.note_error(err);
        self.set_status(message, StatusKind::Error);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_header(frame, chunks[0]);
        match &self.screen {
            Screen::Welcome(menu) | Screen::Home(menu) => self.draw_menu(frame, chunks[1], menu),
            Screen::Stores { purpose, picker } => {
                let rows = picker
                    .items
                    .iter()
                    .enumerate()
                    .map(|(index, row)| row.cells(index + 1))
                    .collect();
                self.draw_picker(
                    frame,
                    chunks[1],
                    purpose.title(),
                    &STORE_HEADERS,
                    rows,
                    picker.selected,
                    &picker.input.buffer,
                );
            }
            Screen::Products {
                store,
                picker,
                purpose,
            } => {
                let rows = picker
                    .items
                    .iter()
                    .enumerate()
                    .map(|(index, product)| product_cells(product, index + 1))
                    .collect();
                let title = match purpose {
                    StorePurpose::Order => format!("{}: choose a product to order", store.name),
                    _ => format!("{}: choose a product", store.name),
                };
                self.draw_picker(
                    frame,
                    chunks[1],
                    &title,
                    &PRODUCT_HEADERS,
                    rows,
                    picker.selected,
                    &picker.input.buffer,
                );
            }
            Screen::Report(view) => self.draw_report(frame, chunks[1], view),
        }
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::Normal => {}
            Mode::SignUp(form)
            | Mode::LogIn(form)
            | Mode::StoreIdPrompt(form)
            | Mode::Quantity { form, .. }
            | Mode::EditProduct { form, .. }
            | Mode::SupplyForm { form, .. } => self.draw_form(frame, area, form),
            Mode::ChooseUpdate { product, menu, .. } => {
                self.draw_update_menu(frame, area, product, menu)
            }
            Mode::Confirm(dialog) => self.draw_confirm(frame, area, dialog),
        }
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Retail Terminal");
        let who = match &self.session {
            Some(session) => Line::from(vec![
                Span::raw("Logged in as "),
                Span::styled(
                    session.user.name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(" ({})", session.role())),
            ]),
            None => Line::from(Span::styled(
                "Not logged in",
                Style::default().fg(Color::DarkGray),
            )),
        };
        let lines = vec![
            Line::from(format!("Connected to {}", self.config.connection_url())),
            who,
        ];
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_menu(&self, frame: &mut Frame, area: Rect, menu: &Menu) {
        let block = Block::default().borders(Borders::ALL).title(menu.title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(inner);

        let items: Vec<ListItem> = menu
            .entries
            .iter()
            .map(|entry| ListItem::new(format!("{:>2}. {}", entry.number, entry.label)))
            .collect();
        let list = List::new(items)
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("▶ ");
        let mut list_state = ListState::default();
        list_state.select(Some(menu.selected));
        frame.render_stateful_widget(list, chunks[0], &mut list_state);

        self.draw_choice_line(frame, chunks[1], &menu.input.buffer, true);
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_picker(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        headers: &[&str],
        rows: Vec<Vec<String>>,
        selected: usize,
        buffer: &str,
    ) {
        let block = Block::default().borders(Borders::ALL).title(title.to_string());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(inner);

        let headers: Vec<String> = headers.iter().map(|header| header.to_string()).collect();
        render_table(frame, chunks[0], &headers, rows, selected, "Nothing to list.");
        self.draw_choice_line(frame, chunks[1], buffer, false);
    }

    fn draw_report(&self, frame: &mut Frame, area: Rect, view: &ReportView) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(view.title.clone());
        let inner = block.inner(area);
        frame.render_widget(block, area);
        render_table(
            frame,
            inner,
            &view.result.columns,
            view.result.rows.clone(),
            view.selected,
            "No rows to display.",
        );
    }

    fn draw_choice_line(&self, frame: &mut Frame, area: Rect, buffer: &str, menu: bool) {
        let prompt = if menu {
            "Please make your choice: "
        } else {
            "Select a number: "
        };
        let line = Line::from(vec![
            Span::styled(prompt, Style::default().fg(Color::Gray)),
            Span::raw(buffer.to_string()),
        ]);
        frame.render_widget(Paragraph::new(line), area);

        if matches!(self.mode, Mode::Normal) {
            let cursor_x = area.x + (prompt.len() + buffer.chars().count()) as u16;
            frame.set_cursor_position((cursor_x, area.y));
        }
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        match (&self.screen, &self.mode) {
            (_, Mode::Confirm(_)) => key_hints(&[("1/y", "Yes"), ("2/n", "No")]),
            (_, Mode::ChooseUpdate { .. }) => key_hints(&[
                ("↑↓", "Navigate"),
                ("Enter", "Select"),
                ("Esc", "Cancel"),
            ]),
            (_, Mode::Normal) => match &self.screen {
                Screen::Welcome(_) | Screen::Home(_) => key_hints(&[
                    ("0-9", "Type choice"),
                    ("↑↓", "Navigate"),
                    ("Enter", "Select"),
                    ("q", "Quit"),
                ]),
                Screen::Stores { .. } | Screen::Products { .. } => key_hints(&[
                    ("0-9", "Type number"),
                    ("↑↓", "Navigate"),
                    ("Enter", "Select"),
                    ("Esc", "Back"),
                    ("q", "Quit"),
                ]),
                Screen::Report(view) if view.query.is_some() => key_hints(&[
                    ("↑↓", "Scroll"),
                    ("x", "Export"),
                    ("Esc", "Back"),
                    ("q", "Quit"),
                ]),
                Screen::Report(_) => {
                    key_hints(&[("↑↓", "Scroll"), ("Esc", "Back"), ("q", "Quit")])
                }
            },
            _ => key_hints(&[
                ("Tab", "Next field"),
                ("Enter", "Submit"),
                ("Esc", "Cancel"),
            ]),
        }
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect, form: &InputForm) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(form.title.clone())
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = (0..form.fields.len())
            .map(|index| form.build_line(index))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to submit • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let cursor_x = inner.x + form.cursor_offset() as u16;
        let cursor_y = inner.y + form.active as u16;
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    fn draw_update_menu(
        &self,
        frame: &mut Frame,
        area: Rect,
        product: &Product,
        menu: &Menu<UpdateKind>,
    ) {
        let popup_area = centered_rect(50, 35, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(format!("Update {}", product.name))
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        frame.render_widget(Paragraph::new(menu.title), chunks[0]);

        let items: Vec<ListItem> = menu
            .entries
            .iter()
            .map(|entry| ListItem::new(format!("{}. {}", entry.number, entry.label)))
            .collect();
        let list = List::new(items)
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("▶ ");
        let mut list_state = ListState::default();
        list_state.select(Some(menu.selected));
        frame.render_stateful_widget(list, chunks[1], &mut list_state);

        let prompt = "Please make your choice: ";
        frame.render_widget(
            Paragraph::new(format!("{prompt}{}", menu.input.buffer)),
            chunks[2],
        );
        let cursor_x = chunks[2].x + (prompt.len() + menu.input.buffer.chars().count()) as u16;
        frame.set_cursor_position((cursor_x, chunks[2].y));
    }

    fn draw_confirm(&self, frame: &mut Frame, area: Rect, dialog: &ConfirmDialog) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(dialog.title.clone())
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = dialog
            .lines
            .iter()
            .map(|line| Line::from(line.clone()))
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from("1. Yes"));
        lines.push(Line::from("2. No"));

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, inner);
    }
}

fn menu_command(menu: &mut Menu, code: KeyCode) -> Command {
    match code {
        KeyCode::Char('q') if menu.input.buffer.is_empty() => Command::Quit,
        KeyCode::Esc => Command::Back,
        KeyCode::Up => {
            menu.move_selection(-1);
            Command::None
        }
        KeyCode::Down => {
            menu.move_selection(1);
            Command::None
        }
        KeyCode::Backspace => {
            menu.input.backspace();
            Command::None
        }
        KeyCode::Char(ch) => {
            menu.input.push_char(ch);
            Command::None
        }
        KeyCode::Enter => match menu.submit() {
            Ok(action) => Command::Menu(action),
            Err(message) => Command::Invalid(message.to_string()),
        },
        _ => Command::None,
    }
}

fn picker_command<T>(
    picker: &mut Picker<T>,
    code: KeyCode,
    pick: impl FnOnce(&T) -> Command,
) -> Command {
    match code {
        KeyCode::Char('q') if picker.input.buffer.is_empty() => Command::Quit,
        KeyCode::Esc => Command::Back,
        KeyCode::Up => {
            picker.move_selection(-1);
            Command::None
        }
        KeyCode::Down => {
            picker.move_selection(1);
            Command::None
        }
        KeyCode::PageUp => {
            picker.move_selection(-PAGE);
            Command::None
        }
        KeyCode::PageDown => {
            picker.move_selection(PAGE);
            Command::None
        }
        KeyCode::Home => {
            picker.select_first();
            Command::None
        }
        KeyCode::End => {
            picker.select_last();
            Command::None
        }
        KeyCode::Backspace => {
            picker.input.backspace();
            Command::None
        }
        KeyCode::Char(ch) => {
            picker.input.push_char(ch);
            Command::None
        }
        KeyCode::Enter => match picker.submit() {
            Ok(index) => picker.get(index).map(pick).unwrap_or(Command::None),
            Err(message) => Command::Invalid(message),
        },
        _ => Command::None,
    }
}

/// Shared key handling for popup forms. Enter moves to the next field and
/// submits from the last one.
fn edit_form(form: &mut InputForm, code: KeyCode) -> FormKey {
    match code {
        KeyCode::Esc => FormKey::Cancel,
        KeyCode::Enter => {
            if form.active + 1 >= form.fields.len() {
                FormKey::Submit
            } else {
                form.next_field();
                FormKey::Edited
            }
        }
        KeyCode::Tab | KeyCode::Down => {
            form.next_field();
            FormKey::Edited
        }
        KeyCode::BackTab | KeyCode::Up => {
            form.previous_field();
            FormKey::Edited
        }
        KeyCode::Backspace => {
            form.backspace();
            form.error = None;
            FormKey::Edited
        }
        KeyCode::Char(ch) => {
            if form.push_char(ch) {
                form.error = None;
            }
            FormKey::Edited
        }
        _ => FormKey::Edited,
    }
}

fn render_table(
    frame: &mut Frame,
    area: Rect,
    headers: &[String],
    rows: Vec<Vec<String>>,
    selected: usize,
    empty_message: &str,
) {
    if rows.is_empty() {
        let message = Paragraph::new(empty_message.to_string())
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(message, area);
        return;
    }

    let header = Row::new(headers.iter().map(|header| Cell::from(header.clone())))
        .style(Style::default().add_modifier(Modifier::BOLD));
    let widths = vec![Constraint::Fill(1); headers.len().max(1)];
    let table = Table::new(rows.into_iter().map(Row::new), widths)
        .header(header)
        .row_highlight_style(Style::default().fg(Color::Yellow))
        .highlight_symbol("▶ ");

    let mut table_state = TableState::default();
    table_state.select(Some(selected));
    frame.render_stateful_widget(table, area, &mut table_state);
}
