// UI module - navigation shell over the session store
//
// This module contains:
// - AppController: history, guarded navigation and sign-in/sign-out flows
// - navigation: sidebar entries and document theme derived from the session

pub mod controller;
pub mod navigation;

pub use controller::{AppController, History, Screen};
pub use navigation::{DocumentTheme, NavItem, document_theme, is_active, navigation_items};
