// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod actions;
pub mod columns;
pub mod ids;
pub mod model;
pub mod pipeline;
pub mod records;
pub mod state;
pub mod validation;
pub mod view;
pub mod view_store;

pub use actions::*;
pub use columns::*;
pub use ids::*;
pub use model::*;
pub use pipeline::*;
pub use records::*;
pub use state::*;
pub use view::*;
pub use view_store::*;
