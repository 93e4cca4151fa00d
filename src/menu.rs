/// The widget's property menu: discrete actions surfaced outside the card's
/// own render tree, each with tooltip/icon metadata and a key binding.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyAction {
    /// Open the original post. Reserved; currently a no-op.
    Open,
    /// Re-fetch the embedded tweet. Reserved; currently a no-op.
    Refresh,
    /// Reset the tweet slot and return to the input form.
    Edit,
}

#[derive(Debug, Clone, Copy)]
pub struct MenuItem {
    pub action: PropertyAction,
    pub tooltip: &'static str,
    pub icon: &'static str,
    pub key: char,
}

pub const MENU: [MenuItem; 3] = [
    MenuItem {
        action: PropertyAction::Open,
        tooltip: "Open Tweet",
        icon: "↗",
        key: 'o',
    },
    MenuItem {
        action: PropertyAction::Refresh,
        tooltip: "Refresh Tweet",
        icon: "⟳",
        key: 'r',
    },
    MenuItem {
        action: PropertyAction::Edit,
        tooltip: "Edit Tweet",
        icon: "✎",
        key: 'e',
    },
];

pub fn action_for_key(key: char) -> Option<PropertyAction> {
    MENU.iter().find(|item| item.key == key).map(|item| item.action)
}
