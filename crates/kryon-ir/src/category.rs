use serde::{Deserialize, Serialize};

/// A closed set of property categories keyed by a 16-bit range root (§4.4).
/// `PropertyId` values are partitioned by their high byte; category lookup
/// for a property is therefore O(1) masking, not a table scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum PropertyCategory {
    Base = 0x0000,
    Layout = 0x0100,
    Visual = 0x0200,
    Typography = 0x0300,
    Interactive = 0x0500,
    ElementSpecific = 0x0600,
    Window = 0x0700,
    Checkbox = 0x0800,
}

impl PropertyCategory {
    pub const ALL: [PropertyCategory; 8] = [
        PropertyCategory::Base,
        PropertyCategory::Layout,
        PropertyCategory::Visual,
        PropertyCategory::Typography,
        PropertyCategory::Interactive,
        PropertyCategory::ElementSpecific,
        PropertyCategory::Window,
        PropertyCategory::Checkbox,
    ];

    /// Root of the 16-bit range this category owns.
    pub fn range_root(self) -> u16 {
        self as u16
    }
}

/// A property identifier: a 16-bit value whose high byte selects the
/// category range root and whose low byte selects the specific property
/// within that range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyId(pub u16);

impl PropertyId {
    pub fn category(self) -> Option<PropertyCategory> {
        let root = self.0 & 0xFF00;
        PropertyCategory::ALL.into_iter().find(|c| c.range_root() == root)
    }
}

/// The closed set of property categories an element type may draw from.
/// Implemented as a bitset over [`PropertyCategory::ALL`]'s index order so
/// membership tests are a single shift-and-mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryClosure(u8);

impl CategoryClosure {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn with(mut self, category: PropertyCategory) -> Self {
        self.insert(category);
        self
    }

    pub fn insert(&mut self, category: PropertyCategory) {
        let bit = PropertyCategory::ALL.iter().position(|c| *c == category).unwrap();
        self.0 |= 1 << bit;
    }

    pub fn contains(self, category: PropertyCategory) -> bool {
        let bit = PropertyCategory::ALL.iter().position(|c| *c == category).unwrap();
        self.0 & (1 << bit) != 0
    }
}

/// Returns the category closure for a known element type name. Unknown
/// element types get the permissive default (every category but Window and
/// Checkbox, which are reserved for the element types that declare them).
pub fn default_closure_for(element_type: &str) -> CategoryClosure {
    let base = CategoryClosure::empty()
        .with(PropertyCategory::Base)
        .with(PropertyCategory::Layout)
        .with(PropertyCategory::Visual)
        .with(PropertyCategory::Typography)
        .with(PropertyCategory::Interactive)
        .with(PropertyCategory::ElementSpecific);

    match element_type {
        "App" | "Window" => base.with(PropertyCategory::Window),
        "Checkbox" | "Radio" | "Toggle" => base.with(PropertyCategory::Checkbox),
        _ => base,
    }
}

/// Maps a property name to the category it belongs to (§4.4). Unknown names
/// default to `ElementSpecific`, the one category every element type carries,
/// so custom/vendor properties never spuriously trip a category violation.
pub fn property_category_by_name(name: &str) -> PropertyCategory {
    match name {
        "width" | "height" | "min_width" | "min_height" | "max_width" | "max_height" | "padding" | "margin"
        | "gap" | "flex" | "flex_direction" | "flex_grow" | "flex_shrink" | "align" | "align_items"
        | "justify" | "justify_content" | "position" | "top" | "left" | "right" | "bottom" | "z_index" => {
            PropertyCategory::Layout
        }
        "background_color" | "color" | "border" | "border_color" | "border_width" | "border_radius"
        | "opacity" | "shadow" | "visible" => PropertyCategory::Visual,
        "font_size" | "font_family" | "font_weight" | "text_align" | "line_height" | "letter_spacing" => {
            PropertyCategory::Typography
        }
        "disabled" | "placeholder" | "value" | "cursor" | "tooltip" => PropertyCategory::Interactive,
        "title" | "resizable" | "icon" | "fullscreen" => PropertyCategory::Window,
        "checked" | "indeterminate" => PropertyCategory::Checkbox,
        _ => PropertyCategory::ElementSpecific,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_from_range_root() {
        let id = PropertyId(0x0201); // Visual + offset 1 (BackgroundColor-like)
        assert_eq!(id.category(), Some(PropertyCategory::Visual));
    }

    #[test]
    fn closure_membership() {
        let closure = CategoryClosure::empty().with(PropertyCategory::Layout);
        assert!(closure.contains(PropertyCategory::Layout));
        assert!(!closure.contains(PropertyCategory::Window));
    }

    #[test]
    fn unknown_property_name_falls_back_to_element_specific() {
        assert_eq!(property_category_by_name("width"), PropertyCategory::Layout);
        assert_eq!(property_category_by_name("my_custom_widget_prop"), PropertyCategory::ElementSpecific);
    }

    #[test]
    fn window_element_gets_window_category() {
        let closure = default_closure_for("App");
        assert!(closure.contains(PropertyCategory::Window));
        let button_closure = default_closure_for("Button");
        assert!(!button_closure.contains(PropertyCategory::Window));
    }
}
