//! Core engine parts: buffer, items, matching, pagination, selection and input mapping.

pub mod buffer;
pub mod collaborators;
pub mod component;
pub mod fuzzy;
pub mod input_event;
pub mod item;
pub mod keybindings;
pub mod matcher;
pub mod measure;
pub mod paginator;
pub mod selection;
pub mod text;
