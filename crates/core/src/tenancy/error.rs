//! Tenancy error taxonomy.

use thiserror::Error;
use uuid::Uuid;

use strata_shared::AppError;

/// Errors raised by the tenant-isolation model.
///
/// Read-side predicate denial is deliberately NOT represented here: a row
/// outside the active context is reported as absent (`Option::None`), so
/// callers cannot distinguish it from a genuine missing row.
#[derive(Debug, Error)]
pub enum TenancyError {
    /// A tenant-scoped statement was attempted with no context set in the
    /// transaction. Fatal; never defaults to a platform-wide view.
    #[error("no tenant context set for this transaction")]
    NoContext,

    /// The resolved organization/association failed membership verification
    /// for a non-staff principal.
    #[error("tenant context validation failed: {0}")]
    ContextValidation(String),

    /// An insert/update attempted to stamp a row with an association that
    /// does not belong to the active organization.
    #[error("association {association_id} does not belong to the active organization")]
    CrossTenantWrite {
        /// The foreign association id the row was stamped with.
        association_id: Uuid,
    },

    /// A write statement was denied by the tenant predicate.
    ///
    /// Distinguishable from a validation error: the payload was well-formed,
    /// the principal simply may not write that row.
    #[error("write denied by tenant policy")]
    WriteDenied,
}

impl From<TenancyError> for AppError {
    fn from(err: TenancyError) -> Self {
        match err {
            TenancyError::NoContext => Self::Unauthorized("no tenant context".to_string()),
            TenancyError::ContextValidation(msg) => Self::Forbidden(msg),
            TenancyError::CrossTenantWrite { .. } | TenancyError::WriteDenied => {
                Self::Forbidden(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_context_maps_to_unauthorized() {
        let app: AppError = TenancyError::NoContext.into();
        assert_eq!(app.status_code(), 401);
    }

    #[test]
    fn test_validation_and_write_errors_map_to_forbidden() {
        let app: AppError = TenancyError::ContextValidation("assoc missing".into()).into();
        assert_eq!(app.status_code(), 403);

        let app: AppError = TenancyError::CrossTenantWrite {
            association_id: Uuid::new_v4(),
        }
        .into();
        assert_eq!(app.status_code(), 403);

        let app: AppError = TenancyError::WriteDenied.into();
        assert_eq!(app.status_code(), 403);
    }
}
