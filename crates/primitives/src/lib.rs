//! Core vocabulary shared by the revalidation crates: element handles, abort reasons,
//! request params and headers, destinations, target strings and the host contract.

/// Abort reasons carried by cancelled operations.
pub mod abort;
/// Request destinations and HTTP methods.
pub mod destination;
/// Opaque element handles.
pub mod element;
/// Boxed future alias.
pub mod future;
/// Case-insensitive request headers.
pub mod headers;
/// Field and form introspection contract.
pub mod host;
/// Typed option layers read from call sites and element attributes.
pub mod options;
/// Ordered, multi-valued request params.
pub mod params;
/// Target selector string utilities.
pub mod target;

pub use abort::AbortReason;
pub use destination::{Destination, Method, ParseMethodError};
pub use element::ElementId;
pub use future::BoxFutureStatic;
pub use headers::Headers;
pub use host::{AbortHook, AbortRegistration, FormDestination, FormHost, GroupMatch, HostEvent, ValidateAttr};
pub use options::{Disable, FocusMode, OptionLayer};
pub use params::{Params, ParamsError};
pub use target::{ORIGIN_PSEUDO, join_targets, resolve_origin, split_target};
