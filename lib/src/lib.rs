#![warn(clippy::pedantic)]
#![allow(
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::many_single_char_names,
    clippy::module_name_repetitions,
    clippy::too_many_lines,
    clippy::similar_names,
    clippy::doc_markdown
)]
pub mod animator;
pub mod bodies;
pub mod camera;
pub mod layout;
pub mod math;
pub mod registry;
pub mod scene;
pub mod stellar;
pub mod time;
pub mod viewmode;

#[cfg(test)]
mod animator_test;
#[cfg(test)]
mod bodies_test;
#[cfg(test)]
mod math_test;
#[cfg(test)]
mod registry_test;
#[cfg(test)]
mod viewmode_test;
