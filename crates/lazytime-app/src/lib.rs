// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod form;
pub mod ids;
pub mod input;
pub mod model;
pub mod panel;
pub mod state;
pub mod store;

pub use form::*;
pub use ids::*;
pub use input::*;
pub use model::*;
pub use panel::*;
pub use state::*;
pub use store::*;
