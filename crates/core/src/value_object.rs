//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. They are built
/// only through a smart constructor that returns `DomainResult<Self>`, so an
/// invalid instance never exists.
///
/// ## Value Object vs Entity
///
/// - **Value Object**: no identity (two values with the same content are equal)
/// - **Entity**: has identity (two entities with the same id are the same entity)
///
/// ## Usage Pattern
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Nights(u32);
///
/// impl Nights {
///     fn new(n: u32) -> DomainResult<Self> {
///         if n == 0 {
///             return Err(DomainError::validation("nights must be positive"));
///         }
///         Ok(Self(n))
///     }
/// }
///
/// impl ValueObject for Nights {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
