//! # Sitecraft Document Model
//!
//! Plain, structurally-cloneable data describing a site: pages, the
//! component arena, style mixins, breakpoints, behaviors, theme and
//! translations.
//!
//! Components live in a single flat arena (`Context::components`); parent
//! and child links are ids resolved by lookup, so the tree never holds
//! cyclic references.
//!
//! ```text
//! Site
//!  ├─ pages: route → Page { root }
//!  ├─ page_order
//!  ├─ defaults: { head, home_page }
//!  └─ context
//!      ├─ ids (namespace, next_id)
//!      ├─ components: id → Component { parent, children, style, ... }
//!      ├─ styles + style_order
//!      ├─ breakpoints, behaviors, theme, i18n
//!      └─ custom_component_ids, custom_child_ids
//! ```

pub mod component;
pub mod id_generator;
pub mod site;
pub mod style;

pub use component::{BehaviorRef, BreakpointStyles, Component, ComponentStyle, PropertyMap, PseudoStyles};
pub use id_generator::{IdAllocator, IdKind};
pub use site::{Context, Defaults, HeadTag, Page, Site, SCHEMA_VERSION};
pub use style::{Behavior, Breakpoint, Font, Style, Theme};
