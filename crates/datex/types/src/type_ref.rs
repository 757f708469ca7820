use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Namespace of the built-in types.
pub const STD_NAMESPACE: &str = "std";

/// Opaque type identity handle: `<namespace:name/variation(parameters)>`.
///
/// Two handles with the same namespace, name, variation and parameters denote
/// the same type. The root type drops variation and parameters, the base type
/// drops only the parameters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeRef {
    namespace: String,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    variation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parameters: Option<Vec<String>>,
}

impl TypeRef {
    /// Type `name` in `namespace`.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            variation: None,
            parameters: None,
        }
    }

    /// A type in the `std` namespace.
    pub fn std(name: impl Into<String>) -> Self {
        Self::new(STD_NAMESPACE, name)
    }

    /// `<std:Any>`, matched by every type.
    pub fn any() -> Self {
        Self::std("Any")
    }

    /// Set the variation. An empty variation clears it.
    pub fn with_variation(mut self, variation: impl Into<String>) -> Self {
        let variation = variation.into();
        self.variation = (!variation.is_empty()).then_some(variation);
        self
    }

    /// Set the type parameters.
    pub fn with_parameters<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters = Some(parameters.into_iter().map(Into::into).collect());
        self
    }

    /// Namespace of the type.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Name within the namespace.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Variation, if any.
    pub fn variation(&self) -> Option<&str> {
        self.variation.as_deref()
    }

    /// Type parameters, if any.
    pub fn parameters(&self) -> Option<&[String]> {
        self.parameters.as_deref()
    }

    /// Whether this is `<std:Any>`.
    pub fn is_any(&self) -> bool {
        self.namespace == STD_NAMESPACE && self.name == "Any"
    }

    /// The type without variation and parameters.
    pub fn root(&self) -> TypeRef {
        Self::new(self.namespace.clone(), self.name.clone())
    }

    /// The type without parameters (variation is kept).
    pub fn base(&self) -> TypeRef {
        Self {
            parameters: None,
            ..self.clone()
        }
    }

    /// Whether the type has neither variation nor parameters.
    pub fn is_root(&self) -> bool {
        self.variation.is_none() && self.parameters.is_none()
    }

    /// Logical type match: does `self` satisfy `against`?
    ///
    /// Identical types and `<std:Any>` always match. A parameterised `against`
    /// matches only a type with the same base type whose parameters are
    /// accepted by `params_match`. Otherwise the check is retried with the
    /// base type, then with the root type.
    pub fn matches_type(
        &self,
        against: &TypeRef,
        params_match: &dyn Fn(&TypeRef, &[String], &[String]) -> bool,
    ) -> bool {
        if self == against || against.is_any() {
            return true;
        }

        if let Some(against_params) = against.parameters() {
            let base = self.base();
            return base == against.base()
                && params_match(&base, self.parameters().unwrap_or(&[]), against_params);
        }

        let base = self.base();
        if base != *self {
            return base.matches_type(against, params_match);
        }
        let root = self.root();
        if root != *self {
            return root.matches_type(against, params_match);
        }
        false
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<")?;
        if self.namespace != STD_NAMESPACE {
            write!(f, "{}:", self.namespace)?;
        }
        f.write_str(&self.name)?;
        if let Some(variation) = &self.variation {
            write!(f, "/{variation}")?;
        }
        if let Some(parameters) = &self.parameters {
            write!(f, "({})", parameters.join(","))?;
        }
        f.write_str(">")
    }
}

impl FromStr for TypeRef {
    type Err = TypeError;

    /// Parses `<ns:name/variation(p1,p2)>`; the brackets and the `std`
    /// namespace are optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let inner = trimmed
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('>'))
            .unwrap_or(trimmed);

        let (head, parameters) = match inner.find('(') {
            Some(open) => {
                let params = inner[open + 1..]
                    .strip_suffix(')')
                    .ok_or_else(|| TypeError::UnterminatedParameters(s.to_string()))?;
                let params = params
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from)
                    .collect::<Vec<_>>();
                (&inner[..open], Some(params))
            }
            None => (inner, None),
        };

        let (qualified, variation) = match head.split_once('/') {
            Some((qualified, variation)) => (qualified, Some(variation)),
            None => (head, None),
        };
        let (namespace, name) = qualified
            .split_once(':')
            .unwrap_or((STD_NAMESPACE, qualified));

        let valid = |part: &str| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
        };
        if !valid(namespace) || !valid(name) || variation.is_some_and(|v| !valid(v)) {
            return Err(TypeError::InvalidTypeName(s.to_string()));
        }

        let mut ty = TypeRef::new(namespace, name);
        if let Some(variation) = variation {
            ty = ty.with_variation(variation);
        }
        if let Some(parameters) = parameters {
            ty = ty.with_parameters(parameters);
        }
        Ok(ty)
    }
}
