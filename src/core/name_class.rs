//! Relax NG name classes — the set-of-names value objects used by
//! `element` and `attribute` patterns to describe which expanded names they
//! accept.

use crate::core::name_resolver::ExpandedName;

/// A Relax NG name class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameClass {
    /// Matches exactly one expanded name.
    Name { ns: String, local: String },
    /// Matches any local name in `ns`, except those matched by `except`.
    NsName {
        ns: String,
        except: Option<Box<NameClass>>,
    },
    /// Matches any expanded name, except those matched by `except`.
    AnyName { except: Option<Box<NameClass>> },
    /// Matches anything either alternative matches.
    NameChoice(Box<NameClass>, Box<NameClass>),
}

impl NameClass {
    pub fn matches(&self, name: &ExpandedName) -> bool {
        match self {
            NameClass::Name { ns, local } => ns == &name.ns && local == &name.local,
            NameClass::NsName { ns, except } => {
                ns == &name.ns && !except.as_ref().is_some_and(|e| e.matches(name))
            }
            NameClass::AnyName { except } => !except.as_ref().is_some_and(|e| e.matches(name)),
            NameClass::NameChoice(a, b) => a.matches(name) || b.matches(name),
        }
    }

    /// Enumerate the concrete names this class matches, or `None` if the
    /// set is open-ended (`NsName`/`AnyName` without a fully enumerable
    /// complement).
    pub fn to_enumeration(&self) -> Option<Vec<ExpandedName>> {
        match self {
            NameClass::Name { ns, local } => Some(vec![ExpandedName::new(ns.clone(), local.clone())]),
            NameClass::NsName { .. } | NameClass::AnyName { .. } => None,
            NameClass::NameChoice(a, b) => {
                let mut a = a.to_enumeration()?;
                let b = b.to_enumeration()?;
                a.extend(b);
                Some(a)
            }
        }
    }

    /// Whether this class can match infinitely many names (`anyName` or
    /// `nsName`, possibly nested inside a choice). Relax NG section 7.3
    /// requires such attributes to live inside a `oneOrMore`.
    pub fn is_infinite(&self) -> bool {
        match self {
            NameClass::Name { .. } => false,
            NameClass::NsName { .. } | NameClass::AnyName { .. } => true,
            NameClass::NameChoice(a, b) => a.is_infinite() || b.is_infinite(),
        }
    }
}

/// Whether two name classes could both match some common expanded name.
/// Used defensively by `Interleave`'s walker (spec section 4.5, point 4) to
/// detect the "two branches matched simultaneously" case that a correctly
/// simplified schema should never produce.
pub fn name_classes_overlap(a: &NameClass, b: &NameClass) -> bool {
    match (a, b) {
        (NameClass::NameChoice(a1, a2), _) => {
            name_classes_overlap(a1, b) || name_classes_overlap(a2, b)
        }
        (_, NameClass::NameChoice(b1, b2)) => {
            name_classes_overlap(a, b1) || name_classes_overlap(a, b2)
        }
        (NameClass::Name { ns, local }, other) | (other, NameClass::Name { ns, local }) => {
            other.matches(&ExpandedName::new(ns.clone(), local.clone()))
        }
        (NameClass::AnyName { .. }, _) | (_, NameClass::AnyName { .. }) => true,
        (NameClass::NsName { ns: ns1, .. }, NameClass::NsName { ns: ns2, .. }) => ns1 == ns2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(ns: &str, local: &str) -> ExpandedName {
        ExpandedName::new(ns, local)
    }

    #[test]
    fn name_matches_exact() {
        let nc = NameClass::Name {
            ns: "urn:x".into(),
            local: "foo".into(),
        };
        assert!(nc.matches(&n("urn:x", "foo")));
        assert!(!nc.matches(&n("urn:x", "bar")));
        assert!(!nc.matches(&n("urn:y", "foo")));
    }

    #[test]
    fn ns_name_with_except() {
        let nc = NameClass::NsName {
            ns: "urn:x".into(),
            except: Some(Box::new(NameClass::Name {
                ns: "urn:x".into(),
                local: "bar".into(),
            })),
        };
        assert!(nc.matches(&n("urn:x", "foo")));
        assert!(!nc.matches(&n("urn:x", "bar")));
        assert!(!nc.matches(&n("urn:y", "foo")));
    }

    #[test]
    fn any_name_matches_everything_but_except() {
        let nc = NameClass::AnyName {
            except: Some(Box::new(NameClass::Name {
                ns: "".into(),
                local: "id".into(),
            })),
        };
        assert!(nc.matches(&n("urn:x", "foo")));
        assert!(!nc.matches(&n("", "id")));
    }

    #[test]
    fn enumeration_is_none_for_open_classes() {
        assert!(NameClass::AnyName { except: None }.to_enumeration().is_none());
        assert!(NameClass::NsName {
            ns: "urn:x".into(),
            except: None
        }
        .to_enumeration()
        .is_none());
    }

    #[test]
    fn enumeration_collects_choice_of_names() {
        let nc = NameClass::NameChoice(
            Box::new(NameClass::Name {
                ns: "".into(),
                local: "a".into(),
            }),
            Box::new(NameClass::Name {
                ns: "".into(),
                local: "b".into(),
            }),
        );
        let names = nc.to_enumeration().unwrap();
        assert_eq!(names, vec![n("", "a"), n("", "b")]);
    }

    #[test]
    fn overlap_detection() {
        let a = NameClass::Name {
            ns: "".into(),
            local: "x".into(),
        };
        let b = NameClass::Name {
            ns: "".into(),
            local: "x".into(),
        };
        let c = NameClass::Name {
            ns: "".into(),
            local: "y".into(),
        };
        assert!(name_classes_overlap(&a, &b));
        assert!(!name_classes_overlap(&a, &c));
        assert!(name_classes_overlap(
            &a,
            &NameClass::AnyName { except: None }
        ));
    }
}
