//! Fixed page contract of the target application.
//!
//! Element ids, XPath regions and UI labels for the pinned application
//! versions (see [`crate::config::VersionPins`]). Nothing here is discovered
//! at runtime.

use crate::browser::{xpath_literal as lit, Locator};

fn has_class(class: &str) -> String {
    format!("contains(concat(\" \",normalize-space(@class),\" \"),\" {} \")", class)
}

// --- Session ---

pub const LOADING_OVERLAY: &str = "__loadingMsg";
pub const BUSY_MESSAGE: &str = "waitmsg";
pub const LOGIN_FORM: &str = "login-form";
pub const USERNAME_INPUT: &str = "j_username";
pub const PASSWORD_INPUT: &str = "j_password";
pub const SUBMIT: &str = "submit";
pub const VERSION_ELEMENT: &str = "_idJsp190";
pub const LEGACY_VERSION_ELEMENT: &str = "_idJsp24";
/// Two variants of the landing page; either one means the login went through.
pub const LANDING_SIGNALS: [&str; 2] = ["_idJsp190", "_idJsp181"];
pub const RETURN_TO_PORTAL: &str = "Torna al portale";

pub fn loading_overlay() -> Locator {
    Locator::id(LOADING_OVERLAY)
}

pub fn busy_message() -> Locator {
    Locator::id(BUSY_MESSAGE)
}

pub fn landing_signals() -> Vec<Locator> {
    LANDING_SIGNALS.iter().map(|id| Locator::id(*id)).collect()
}

pub fn portal_home() -> Locator {
    Locator::xpath("/html/body/nav/a//span[.=\"Applicazioni e Servizi\"]")
}

pub fn status_bar() -> Locator {
    Locator::id("statusbar-panel-left")
}

pub fn status_bar_user(username: &str) -> Locator {
    Locator::xpath(format!("//*[@id=\"statusbar-panel-left\"]/span[.={}]", lit(username)))
}

// --- Navigation ---

pub const MENU_CURRICULUM: &str = "curriculum";
pub const MENU_PRINTOUTS: &str = "stampe";
pub const OPTION_MARKS: &str = "caricamentoVoti";
pub const OPTION_RESUMPTION: &str = "ripresaScrutinio";
pub const OPTION_ABSENCES: &str = "assenze";
pub const OPTION_CLASS_ABSENCES: &str = "assenze:assenzeClasse";
pub const OPTION_ABSENCE_REGISTER: &str = "assenze:RegistroAssenze";

pub fn toolbar_button(title: &str) -> Locator {
    Locator::xpath(format!("//*[@id=\"toolbar:toolbarframe\"]//a/img[@title={}]", lit(title)))
}

pub fn menu(menu: &str) -> Locator {
    Locator::id(format!("menu:menu:{}", menu))
}

pub fn menu_option(menu: &str, option: &str) -> Locator {
    Locator::id(format!("menu:menu:{}:{}", menu, option))
}

/// The frame every curriculum module is rendered in.
pub fn module_frame() -> Locator {
    Locator::xpath("//*[@id=\"sheet-wsx:_idJsp0\"]/iframe")
}

pub fn combobox_button(container: &str) -> Locator {
    Locator::xpath(format!(
        "//*[contains(@id,{})]//div[{}]",
        lit(container),
        has_class("btl-comboBox-button")
    ))
}

/// Cells of every open legacy drop-down carrying `option`.
pub fn dropdown_option(option: &str) -> Locator {
    Locator::xpath(format!(
        "/html/body/div[{}]/table//td[.={}]",
        has_class("btl-comboBox-dropDown"),
        lit(option)
    ))
}

/// Sibling cell of the same drop-down, relative to a `dropdown_option` cell.
pub fn dropdown_sibling(option: &str) -> Locator {
    Locator::xpath(format!("../../tr/td[.={}]", lit(option)))
}

pub fn form_button(form: &str, value: &str) -> Locator {
    Locator::xpath(format!(
        "//*[contains(@id,{})]//*[{}]/table//div[.={}]",
        lit(form),
        has_class("btl-button"),
        lit(value)
    ))
}

/// Label of a picker field; the label id leads to the input and list ids.
pub fn field_label(label: &str) -> Locator {
    Locator::xpath(format!("//*/label/span/span[.={}]", lit(&format!("{}:", label))))
}

pub fn input_with_id(id: &str) -> Locator {
    Locator::xpath(format!("//*/input[@id={}]", lit(id)))
}

pub fn picker_option(bound_view: &str, choice: &str) -> Locator {
    Locator::xpath(format!(
        "//*/li[@role=\"option\" and @data-boundview={} and .={}]",
        lit(bound_view),
        lit(choice)
    ))
}

pub fn grid_picker_option(bound_view: &str, choice: &str) -> Locator {
    Locator::xpath(format!(
        "//*/div[@role=\"option\" and @data-boundview={} and .={}]",
        lit(bound_view),
        lit(choice)
    ))
}

pub fn checkbox_label(label: &str) -> Locator {
    Locator::xpath(format!("//*/label[.={}]", lit(label)))
}

pub fn aria_button(label: &str) -> Locator {
    Locator::xpath(format!("//*/a[@role=\"button\" and @aria-label={}]", lit(label)))
}

pub fn title_starting_with(text: &str) -> Locator {
    Locator::xpath(format!(
        "//*/div[{} and starts-with(text(), {})]",
        has_class("title-3"),
        lit(text)
    ))
}

pub fn split_button(label: &str) -> Locator {
    Locator::xpath(format!(
        "//*/a[starts-with(@id,\"splitbutton-\") and @role=\"button\" and .={}]",
        lit(label)
    ))
}

pub fn menu_item(label: &str) -> Locator {
    Locator::xpath(format!(
        "//*/a[starts-with(@id,\"menuitem-\") and @role=\"menuitem\" and .={}]",
        lit(label)
    ))
}

pub fn dialog_button(label: &str) -> Locator {
    Locator::xpath(format!(
        "//*/a[starts-with(@id,\"button-\") and @role=\"button\" and .={}]",
        lit(label)
    ))
}

pub fn alert_dialog_button(label: &str) -> Locator {
    Locator::xpath(format!(
        "//*/div[@role=\"alertdialog\"]//a[@role=\"button\"]//span[@data-ref=\"btnInnerEl\" and .={}]",
        lit(label)
    ))
}

pub fn view_button(view_prefix: &str, label: &str) -> Locator {
    Locator::xpath(format!(
        "//*/div[starts-with(@id,{})]//a[@role=\"button\" and @aria-label={}]",
        lit(view_prefix),
        lit(label)
    ))
}

pub fn column_header(text: &str) -> Locator {
    Locator::xpath(format!(
        "//*/span[@data-ref=\"textInnerEl\" and @class=\"x-column-header-text-inner\" and .={}]",
        lit(text)
    ))
}

pub const YES: &str = "Sì";
pub const NEXT: &str = "Avanti";
pub const SAVE: &str = "Salva";
pub const BACK: &str = "Indietro";
pub const CONFIRM: &str = "Conferma";
pub const PRINT: &str = "Stampa";
pub const ACTIONS: &str = "Azioni";
pub const LOCK_MARKS: &str = "Blocca voti";
pub const AUTO_AVERAGE: &str = "Inserisce automaticamente la Media";
pub const QUICK_ENTRY: &str = "Inserimento Rapido Cred./Integ./Media/Esito";
pub const PRINT_BOARD: &str = "Stampa Tabellone";
pub const TRANSFER_TO_RECORDS: &str = "Riporta Esito e Media nelle Schede Annuali";
pub const PERIOD_FIELD: &str = "Periodo della Classe";
pub const BOARD_TEMPLATE_FIELD: &str = "Modello Tabellone Voti";
pub const OPERATION_FIELD: &str = "Operazione";
pub const EXCLUDE_WITHDRAWN: &str = "Escludi Ritirati/Trasferiti entro il";
pub const SAVE_PDF: &str = "Salva Stampa Pdf su Disco";

pub const DETAIL_VIEW: &str = "dettagliovotipermateriaview-";
pub const QUICK_ENTRY_VIEW: &str = "inserimentorapidocolaggview-";
pub const BOARD_OPTIONS_VIEW: &str = "opzionidistampatabelloneview-";

// --- Class selection ---

pub fn school_tree_root(school: &str) -> Locator {
    Locator::xpath(format!("//*/span[{} and .={}]", has_class("x-tree-node-text"), lit(school)))
}

pub fn tree_cells() -> Locator {
    Locator::xpath(format!(
        "//*/table[{}]//td[{}]/div[{}]",
        has_class("x-grid-item"),
        has_class("x-grid-cell"),
        has_class("x-grid-cell-inner")
    ))
}

/// Leaf icon inside a tree cell.
pub fn tree_leaf() -> Locator {
    Locator::xpath(format!("div[{}]", has_class("x-tree-icon-leaf")))
}

/// Node text of a tree leaf, relative to the leaf icon.
pub fn tree_node_text() -> Locator {
    Locator::xpath(format!("ancestor::*/span[{}]", has_class("x-tree-node-text")))
}

pub fn class_search_root(school: &str) -> Locator {
    Locator::xpath(format!("//*/span[.={}]", lit(school)))
}

pub fn school_year_input() -> Locator {
    Locator::xpath("//*[@id=\"sheet-ricercaClasseAlunni:_idJsp4\"]/div/input[2]")
}

pub fn school_year_spinner(up: bool) -> Locator {
    let button = if up { "btl-spinner-upButton" } else { "btl-spinner-downButton" };
    Locator::xpath(format!(
        "//*[@id=\"sheet-ricercaClasseAlunni:_idJsp4\"]/div/div/div[{}]",
        has_class(button)
    ))
}

pub fn class_search_tree_node() -> Locator {
    Locator::xpath("//*[@id=\"sheet-ricercaClasseAlunni:tree\"]/div[2]/div/div/div/div/div/div/span")
}

pub fn class_list_ready() -> Locator {
    Locator::id("listgrid-listaclassi-ricerca:listgrid-classi-ricerca_0:denominazione")
}

pub fn class_list_rows() -> Locator {
    Locator::xpath("//*[@id=\"listgrid-listaclassi-ricerca:listgrid-classi-ricerca\"]/div[3]/table//tr")
}

/// Value cells of a class list row: name, year, section.
pub fn class_list_values() -> Locator {
    Locator::xpath("td//span[@class=\"value\"]")
}

pub fn grandparent() -> Locator {
    Locator::xpath("../..")
}

pub fn class_search_confirm() -> Locator {
    Locator::xpath(format!(
        "//*[contains(@id,\"sheet-ricercaClasseAlunni:\") and {}]/table//div[.=\"Conferma\" and {}]",
        has_class("btl-button"),
        has_class("btl-button-padding")
    ))
}

// --- Mark grids ---

pub const ROLE_TEXTBOX: &str = "textbox";
pub const ROLE_SPINBUTTON: &str = "spinbutton";

/// Row of a detail grid by record index.
pub fn grid_record(index: usize) -> Locator {
    Locator::xpath(format!("//*/table[@data-recordindex=\"{}\"]", index))
}

pub fn grid_input(index: usize, column: usize, role: &str) -> Locator {
    Locator::xpath(format!(
        "//*/table[@data-recordindex=\"{}\"]/tbody/tr/td[{}]//input[@type=\"text\" and @role={}]",
        index,
        column,
        lit(role)
    ))
}

/// Withdrawn/transferred flag inside a grid row.
pub fn withdrawn_icon() -> Locator {
    Locator::xpath(".//img[contains(@src,\"interruzione.png\")]")
}

/// Locked (name) half of a summary grid row.
pub fn summary_record(index: usize) -> Locator {
    Locator::xpath(format!(
        "//*/table[starts-with(@id,\"tableview-\") and @data-recordindex=\"{}\"]",
        index
    ))
}

/// Cell of the scrolling (values) half of a summary grid row.
pub fn summary_cell(index: usize, record_id: &str, bound_view: &str, column: usize) -> Locator {
    Locator::xpath(format!(
        "//*/table[starts-with(@id,\"tableview-\") and @data-recordindex=\"{}\" and @data-recordid={} and @data-boundview!={}]/tbody/tr/td[{}]/div",
        index,
        lit(record_id),
        lit(bound_view),
        column
    ))
}

const SUMMARY_HEADERS: &str =
    "//*/div[starts-with(@id,\"headercontainer-\") and @role=\"row\"]/div/div/div[starts-with(@id,\"gridcolumn-\") and @data-qtip]";

/// Subject column headers whose tooltip carries the abbreviated name.
pub fn summary_headers_by_tooltip() -> Locator {
    Locator::xpath(SUMMARY_HEADERS)
}

/// Subject column header texts.
pub fn summary_header_texts() -> Locator {
    Locator::xpath(format!(
        "{}//span[starts-with(@id,\"gridcolumn-\") and @data-ref=\"textInnerEl\"]",
        SUMMARY_HEADERS
    ))
}

pub fn quick_entry_record(index: usize) -> Locator {
    Locator::xpath(format!(
        "//*/div[starts-with(@id,{}) and @data-ref=\"targetEl\"]//table[@data-recordindex=\"{}\"]",
        lit(QUICK_ENTRY_VIEW),
        index
    ))
}

pub fn record_input(index: usize, record_id: &str, column: usize, role: &str) -> Locator {
    Locator::xpath(format!(
        "//*/table[@data-recordindex=\"{}\" and @data-recordid={}]/tbody/tr/td[{}]//input[@type=\"text\" and @role={}]",
        index,
        lit(record_id),
        column,
        lit(role)
    ))
}

pub fn record_picker_trigger(index: usize, record_id: &str, column: usize) -> Locator {
    Locator::xpath(format!(
        "//*/table[@data-recordindex=\"{}\" and @data-recordid={}]/tbody/tr/td[{}]//div[substring(@id,string-length(@id)-14)=\"-trigger-picker\"]",
        index,
        lit(record_id),
        column
    ))
}

// --- Absences ---

pub const ABSENT: &str = "Assenza";
pub const NOT_ABSENT: &str = "(Nessuna)";
pub const ABSENCE_REASON: &str = "ASSENZA";
pub const ABSENCE_MONTH_COMBO: &str = "sheet-assenzeClasse:mesi";
pub const ABSENCE_REPORT: &str = "Registro_Assenze";

pub fn absence_class_banner(year: &str, section: &str) -> Locator {
    Locator::xpath(format!(
        "//*[contains(@id,\"sheet-assenzeClasse:_idJsp\") and {} and starts-with(@value, {})]",
        has_class("inputreadonly"),
        lit(&format!("{} {}", year, section))
    ))
}

/// Student link of an absence grid row, 1-based.
pub fn absence_row_link(row: usize) -> Locator {
    Locator::xpath(format!("//*[@id=\"assenzegriglia:pannello\"]//table/tbody/tr[{}]/td[1]/a", row))
}

/// Withdrawn flag on the row of an absence grid link.
pub fn absence_row_withdrawn() -> Locator {
    Locator::xpath("ancestor::tr[1]//img[contains(@src,\"interruzione.png\")]")
}

pub fn absence_student_header(key: &str) -> Locator {
    Locator::xpath(format!(
        "//*[@id=\"sheet-assenzePerAlunno:alunno\" and translate(@value,\" \",\"\")={}]",
        lit(key)
    ))
}

pub fn absence_day_table() -> Locator {
    Locator::id("assenzealunno:tabella")
}

pub fn absence_day_rows() -> Locator {
    Locator::xpath("//*[@id=\"assenzealunno:tabella:body\"]/tr")
}

pub fn absence_day_label() -> Locator {
    Locator::xpath("td[1]/span")
}

/// Drop-down button of a day row: column 2 is the kind, column 3 the reason.
pub fn absence_day_combo(column: usize) -> Locator {
    Locator::xpath(format!("td[{}]//div[{}]", column, has_class("btl-comboBox-button")))
}

pub fn absence_day_value() -> Locator {
    Locator::xpath("td[2]//input")
}

pub fn absence_save() -> Locator {
    Locator::id("sheet-assenzePerAlunno:btn-assenzealunno")
}

pub fn absence_close() -> Locator {
    Locator::xpath("//*[@id=\"sheet-assenzePerAlunno:chiudi\"]/div/a")
}

pub fn report_options_sheet() -> Locator {
    Locator::id("sheet-sceltaOpzioniRegistroAssenze:sheet")
}

pub const REPORT_OPTIONS_FORM: &str = "sheet-sceltaOpzioniRegistroAssenze:form:";
pub const REPORT_MONTH_COMBO: &str = "sheet-sceltaOpzioniRegistroAssenze:sheet";
pub const PRINT_OPTIONS_FORM: &str = "sheet-opzioniStampe:form:";
pub const PRINT_OPERATION_COMBO: &str = "sheet-opzioniStampe:form:_idJsp18";

pub fn print_options_sheet() -> Locator {
    Locator::id("sheet-opzioniStampe:sheet")
}

// --- Legacy grading application: admission comments ---

pub const LEGACY_COMMENTS_TOOL: &str = "Registazione Giudizi";
pub const LEGACY_CLASS_FORM: &str = "ricercaClasseAlunni:sheet";
pub const LEGACY_PANEL_FORM: &str = "sheet-sceltariquadroperiodo:form";
pub const LEGACY_PANEL_COMBO: &str = "sheet-sceltariquadroperiodo:form:_idJsp4";
pub const LEGACY_PERIOD_COMBO: &str = "sheet-sceltariquadroperiodo:form:_idJsp7";
pub const ADMISSION_PANEL: &str = "DIP-Ammissione esami di stato";
pub const ADMISSION_PERIOD: &str = "SF1-Scrutinio finale";

pub fn legacy_class_search() -> Locator {
    Locator::xpath("//*[@id=\"sheet-ricercaClasseAlunni:sheet\"]//a/label[.=\"Struttura della Scuola\"]")
}

pub fn legacy_panel_choice() -> Locator {
    Locator::xpath("//*[@id=\"sheet-sceltariquadroperiodo:sheet\"]/div//a/label[.=\"Scelta Riquadro e Periodo\"]")
}

pub fn comment_list() -> Locator {
    Locator::xpath("//*[@id=\"sheet-listaalunnigiudizi:sheet\"]//div/label[.=\"Caricamento Giudizi\"]")
}

pub fn comment_row_surname(row: usize) -> Locator {
    Locator::id(format!("sheet-listaalunnigiudizi:listgrid-alunni_{}:cognome", row))
}

pub fn comment_row_first_name(row: usize) -> Locator {
    Locator::id(format!("sheet-listaalunnigiudizi:listgrid-alunni_{}:nome", row))
}

pub fn comment_row_withdrawn(row: usize) -> Locator {
    Locator::xpath(format!(
        "//*[@id=\"sheet-listaalunnigiudizi:listgrid-alunni_{}:_idJsp9\"][@src=\"./images/interruzione.png\"]",
        row
    ))
}

pub fn comment_modify() -> Locator {
    Locator::id("sheet-listaalunnigiudizi:_idJsp1")
}

pub fn comment_list_close() -> Locator {
    Locator::id("sheet-listaalunnigiudizi:_idJsp0")
}

pub fn comment_student_title(name: &str) -> Locator {
    Locator::xpath(format!(
        "//*[@id=\"sheet-caricamentogiudizi:sheet\"]//div/label[contains(text(),{})]",
        lit(name)
    ))
}

pub fn comment_edit() -> Locator {
    Locator::xpath("//*[@id=\"panel-giudizio:edita_giudizio\"]/div/img")
}

pub fn comment_text() -> Locator {
    Locator::id("panel-giudizio:textArea-giudizio")
}

pub fn comment_save() -> Locator {
    Locator::id("sheet-caricamentogiudizi:_idJsp1")
}

pub fn comment_close() -> Locator {
    Locator::id("sheet-caricamentogiudizi:_idJsp0")
}
