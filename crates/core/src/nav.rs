//! Navigation primitives: act on a control, then wait for the page to settle.

use crate::browser::{ElementRef, Key, Locator};
use crate::context::{ClassPeriodContext, SchoolClass};
use crate::contract;
use crate::error::{AutomationError, Result};
use crate::session::{Session, SessionState};

fn class_not_present(class: &SchoolClass) -> AutomationError {
    AutomationError::not_found(format!("class \"{}\" not present", class))
}

impl Session {
    // --- Menus and toolbars ---

    /// Click a toolbar icon and wait for the screen it opens.
    pub fn toolbar(&mut self, title: &str, settled: &Locator) -> Result<()> {
        self.click(&contract::toolbar_button(title))?;
        self.wait_present(settled)?;
        self.wait_loading()?;
        self.debug_screen(&format!("Toolbar \"{}\"", title));
        Ok(())
    }

    /// Open `menu`, walk it with `keys`, then pick `option`.
    ///
    /// Without a `settled` locator the menu entry gives no DOM signal, so the
    /// session pauses instead.
    pub fn menu(&mut self, menu: &str, option: &str, keys: &[Key], settled: Option<&Locator>) -> Result<()> {
        self.set_state(SessionState::NavigatingModule);
        let root = self.click(&contract::menu(menu))?;
        self.debug_screen(&format!("Menu \"{}\"", menu));
        for key in keys {
            self.browser().send_key(&root, *key)?;
        }
        let entry = self.wait_visible(&contract::menu_option(menu, option))?;
        self.browser().click(&entry)?;
        match settled {
            Some(locator) => {
                self.wait_present(locator)?;
            }
            None => self.settle(),
        }
        self.wait_loading()?;
        self.set_state(SessionState::Authenticated);
        self.debug_screen(&format!("Menu \"{}/{}\"", menu, option));
        Ok(())
    }

    /// Open a second-level menu entry: the keys are sent to the first-level
    /// entry `parent` to unfold it.
    pub fn submenu(&mut self, menu: &str, parent: &str, keys: &[Key], option: &str) -> Result<()> {
        self.set_state(SessionState::NavigatingModule);
        self.click(&contract::menu(menu))?;
        self.debug_screen(&format!("Menu \"{}\"", menu));
        let branch = self.wait_visible(&contract::menu_option(menu, parent))?;
        for key in keys {
            self.browser().send_key(&branch, *key)?;
        }
        self.debug_screen(&format!("Menu \"{}/{}\"", menu, parent));
        let entry = self.wait_visible(&contract::menu_option(menu, option))?;
        self.browser().click(&entry)?;
        self.wait_loading()?;
        self.set_state(SessionState::Authenticated);
        self.debug_screen(&format!("Menu \"{}/{}\"", menu, option));
        Ok(())
    }

    // --- Form controls ---

    /// Pick `option` from the legacy drop-down inside `container`.
    pub fn combobox(&mut self, container: &str, option: &str) -> Result<()> {
        let button = self.wait_visible(&contract::combobox_button(container))?;
        self.browser().click(&button)?;
        let cell = self.find(&contract::dropdown_option(option))?;
        self.scroll_and_click(&cell)?;
        self.wait_loading()?;
        self.debug_screen(&format!("Combobox \"{}\" = \"{}\"", container, option));
        Ok(())
    }

    /// Open the picker of the field labelled `label` and choose `choice`.
    fn pick_labelled(&mut self, label: &str, choice: &str) -> Result<()> {
        let label_el = self.find(&contract::field_label(label))?;
        let label_id = self.attribute(&label_el, "id")?;
        let input_id = label_id.replace("-labelTextEl", "-inputEl");
        let input = self.find(&contract::input_with_id(&input_id))?;
        self.browser().send_key(&input, Key::ArrowDown)?;
        let picker = input_id.replace("-inputEl", "-picker");
        let option = self.wait_visible(&contract::picker_option(&picker, choice))?;
        self.browser().click(&option)
    }

    /// Labelled picker followed by the "Avanti" button.
    pub fn labelled_option(&mut self, label: &str, choice: &str) -> Result<()> {
        self.pick_labelled(label, choice)?;
        self.click(&contract::aria_button(contract::NEXT))?;
        self.wait_busy()?;
        self.debug_screen(&format!("Option \"{}\" = \"{}\"", label, choice));
        Ok(())
    }

    /// Labelled picker that applies on selection.
    pub fn labelled_combo(&mut self, label: &str, choice: &str) -> Result<()> {
        self.pick_labelled(label, choice)?;
        self.wait_busy()?;
        self.debug_screen(&format!("Option \"{}\" = \"{}\"", label, choice));
        Ok(())
    }

    pub fn check_label(&mut self, label: &str) -> Result<()> {
        let el = self.find(&contract::checkbox_label(label))?;
        self.scroll_and_click(&el)?;
        self.debug_screen(&format!("Checkbox \"{}\"", label));
        Ok(())
    }

    /// Click a legacy form button and wait for the screen it leads to.
    pub fn button(&mut self, form: &str, value: &str, settled: &Locator) -> Result<()> {
        self.click(&contract::form_button(form, value))?;
        self.wait_present(settled)?;
        self.wait_loading()?;
        self.debug_screen(&format!("Button \"{}\"", value));
        Ok(())
    }

    /// Open the "Azioni" split button and pick `item`.
    pub fn actions_menu(&mut self, item: &str) -> Result<()> {
        let actions = self.wait_visible(&contract::split_button(contract::ACTIONS))?;
        self.scroll_and_click(&actions)?;
        let entry = self.find(&contract::menu_item(item))?;
        self.scroll_and_click(&entry)?;
        self.debug(&format!("Action \"{}\"", item));
        Ok(())
    }

    /// Confirm a modal dialog button.
    pub fn confirm_dialog(&mut self, label: &str) -> Result<()> {
        let button = self.wait_visible(&contract::dialog_button(label))?;
        self.browser().click(&button)
    }

    pub fn confirm_alert_dialog(&mut self, label: &str) -> Result<()> {
        let button = self.wait_visible(&contract::alert_dialog_button(label))?;
        self.scroll_and_click(&button)
    }

    /// Press a toolbar button of the view whose id starts with `view`.
    pub fn view_button(&mut self, view: &str, label: &str) -> Result<()> {
        let button = self.find(&contract::view_button(view, label))?;
        self.scroll_and_click(&button)
    }

    /// Save the current view, wait for the confirmation to pass, go back.
    pub fn save_and_back(&mut self, view: &str) -> Result<()> {
        self.view_button(view, contract::SAVE)?;
        self.wait_busy()?;
        self.settle();
        self.view_button(view, contract::BACK)
    }

    // --- Class selection ---

    /// Pick a class from the school tree shown inside the module frame.
    pub fn choose_class(&mut self, class: &SchoolClass) -> Result<()> {
        let frame = self.find(&Locator::tag("iframe"))?;
        self.browser().switch_to_frame(&frame)?;
        self.wait_loading()?;
        self.wait_busy()?;
        let school = self.school_name().to_string();
        self.wait_visible(&contract::school_tree_root(&school))?;

        let id = class.id();
        let cells = self.browser().find_elements(&contract::tree_cells())?;
        for cell in cells {
            self.browser().scroll_into_view(&cell)?;
            let leaf = match self.browser().find_child(&cell, &contract::tree_leaf())? {
                Some(leaf) => leaf,
                None => continue,
            };
            let node = self.find_in(&leaf, &contract::tree_node_text())?;
            if self.browser().text_content(&node)?.trim().starts_with(&id) {
                self.debug_screen(&format!("Class \"{}\"", id));
                self.browser().click(&node)?;
                self.wait_busy()?;
                return Ok(());
            }
        }
        Err(class_not_present(class))
    }

    /// Step the school-year spinner from `current` to `target`.
    pub fn change_school_year(&mut self, target: i32, current: i32) -> Result<()> {
        let spinner = contract::school_year_spinner(target > current);
        for _ in 0..(target - current).unsigned_abs() {
            self.click(&spinner)?;
            self.wait_loading()?;
        }
        self.debug_screen(&format!("School year {}", target));
        Ok(())
    }

    /// Pick a class from the class-search list and confirm it.
    pub fn choose_class_in_list(&mut self, class: &SchoolClass, school_year: Option<i32>) -> Result<()> {
        self.select_class_in_list(class, school_year)?;
        let confirm = self.wait_present(&contract::class_search_confirm())?;
        self.browser().click(&confirm)?;
        self.wait_loading()?;
        self.debug_screen(&format!("Class \"{}\"", class));
        Ok(())
    }

    /// Highlight a class in the class-search list, switching school year
    /// first when one is given. The caller confirms the choice.
    pub fn select_class_in_list(&mut self, class: &SchoolClass, school_year: Option<i32>) -> Result<()> {
        let school = self.school_name().to_string();
        self.wait_visible(&contract::class_search_root(&school))?;

        if let Some(target) = school_year {
            let input = self.find(&contract::school_year_input())?;
            let shown = self.attribute(&input, "value")?;
            let current: i32 = shown
                .trim()
                .parse()
                .map_err(|_| AutomationError::other(format!("unreadable school year \"{}\"", shown)))?;
            if current != target {
                self.change_school_year(target, current)?;
            }
        }

        self.click(&contract::class_search_tree_node())?;
        self.wait_present(&contract::class_list_ready())?;
        self.wait_loading()?;

        let target = self.find_class_row(class)?.ok_or_else(|| class_not_present(class))?;
        self.scroll_and_click(&target)?;
        self.wait_loading()
    }

    /// Clickable row of the class list showing `class`.
    fn find_class_row(&mut self, class: &SchoolClass) -> Result<Option<ElementRef>> {
        let rows = self.browser().find_elements(&contract::class_list_rows())?;
        for row in rows {
            let values = self.browser().find_children(&row, &contract::class_list_values())?;
            if values.len() < 3 {
                continue;
            }
            let year = self.browser().text_content(&values[1])?;
            let section = self.browser().text_content(&values[2])?;
            if year == class.year && section == class.section {
                return Ok(Some(self.find_in(&values[2], &contract::grandparent())?));
            }
        }
        Ok(None)
    }

    // --- Postconditions ---

    /// Fail unless the title bars show the expected class and period.
    pub fn assert_context(&mut self, context: &ClassPeriodContext) -> Result<()> {
        for title in context.title_postconditions() {
            self.wait_visible(&title)?;
        }
        Ok(())
    }
}
