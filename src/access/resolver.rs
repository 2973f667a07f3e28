use crate::error::Result;
use crate::types::Right;

/// Where a right on a resource came from, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantSource {
    NamespaceOwner,
    ListOwner,
    ListShare,
    NamespaceShare,
    LinkShare,
}

/// The outcome of resolving a principal against one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Access {
    grant: Option<(Right, GrantSource)>,
}

impl Access {
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn right(&self) -> Option<Right> {
        self.grant.map(|(right, _)| right)
    }

    #[must_use]
    pub fn source(&self) -> Option<GrantSource> {
        self.grant.map(|(_, source)| source)
    }

    #[must_use]
    pub fn can_read(&self) -> bool {
        self.grant.is_some()
    }

    #[must_use]
    pub fn can_write(&self) -> bool {
        self.right().is_some_and(Right::can_write)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.right().is_some_and(Right::is_admin)
    }
}

/// Picks the highest right over an ordered set of grant sources.
///
/// Sources are fed in evaluation order. Once an admin grant is found the
/// remaining lazy sources are skipped. The resolver never touches storage
/// itself; lazy sources are closures supplied by the caller.
#[derive(Debug, Default)]
pub struct Resolver {
    best: Option<(Right, GrantSource)>,
}

impl Resolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn consider(&mut self, source: GrantSource, right: Option<Right>) -> &mut Self {
        if let Some(right) = right {
            // Ignore garbage values from storage rather than granting them.
            if right.is_valid().is_err() {
                tracing::warn!(?source, %right, "Ignoring invalid stored right");
                return self;
            }
            match self.best {
                Some((best, _)) if best >= right => {}
                _ => self.best = Some((right, source)),
            }
        }
        self
    }

    /// Like [`Resolver::consider`], but only evaluates `lookup` when no
    /// admin grant has been found yet.
    pub fn consider_with<F>(&mut self, source: GrantSource, lookup: F) -> Result<&mut Self>
    where
        F: FnOnce() -> Result<Option<Right>>,
    {
        if self.is_admin() {
            return Ok(self);
        }
        let right = lookup()?;
        Ok(self.consider(source, right))
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.best.is_some_and(|(right, _)| right.is_admin())
    }

    #[must_use]
    pub fn finish(&self) -> Access {
        Access { grant: self.best }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_no_grants_denies() {
        let access = Resolver::new().finish();
        assert!(!access.can_read());
        assert!(!access.can_write());
        assert!(!access.is_admin());
        assert_eq!(access, Access::none());
    }

    #[test]
    fn test_highest_grant_wins() {
        let access = Resolver::new()
            .consider(GrantSource::ListShare, Some(Right::READ))
            .consider(GrantSource::NamespaceShare, Some(Right::READ_WRITE))
            .consider(GrantSource::LinkShare, None)
            .finish();

        assert_eq!(access.right(), Some(Right::READ_WRITE));
        assert_eq!(access.source(), Some(GrantSource::NamespaceShare));
        assert!(access.can_write());
        assert!(!access.is_admin());
    }

    #[test]
    fn test_equal_grant_keeps_earlier_source() {
        let access = Resolver::new()
            .consider(GrantSource::ListShare, Some(Right::READ_WRITE))
            .consider(GrantSource::NamespaceShare, Some(Right::READ_WRITE))
            .finish();
        assert_eq!(access.source(), Some(GrantSource::ListShare));
    }

    #[test]
    fn test_admin_short_circuits_lazy_sources() {
        let mut resolver = Resolver::new();
        resolver.consider(GrantSource::NamespaceOwner, Some(Right::ADMIN));
        resolver
            .consider_with(GrantSource::ListShare, || Err(Error::Internal("not evaluated".into())))
            .unwrap();

        let access = resolver.finish();
        assert!(access.is_admin());
        assert_eq!(access.source(), Some(GrantSource::NamespaceOwner));
    }

    #[test]
    fn test_lazy_source_errors_propagate() {
        let mut resolver = Resolver::new();
        let result =
            resolver.consider_with(GrantSource::ListShare, || Err(Error::Internal("boom".into())));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_stored_right_is_ignored() {
        let access = Resolver::new()
            .consider(GrantSource::ListShare, Some(Right::new(7)))
            .finish();
        assert!(!access.can_read());
    }
}
