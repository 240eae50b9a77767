pub mod require_principal;

pub use require_principal::RequirePrincipal;
