/// Known fleet API resources and name lookup

#[derive(Debug, Clone)]
pub struct Resource {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub path: &'static str,
  pub description: &'static str,
}

/// All resources reachable through `list`
pub const RESOURCES: &[Resource] = &[
  Resource {
    name: "vehicles",
    aliases: &["v", "vehicle", "cars"],
    path: "/api/vehicles",
    description: "Fleet vehicles",
  },
  Resource {
    name: "drivers",
    aliases: &["d", "driver"],
    path: "/api/drivers",
    description: "Registered drivers",
  },
  Resource {
    name: "contracts",
    aliases: &["c", "contract"],
    path: "/api/contracts",
    description: "Rental and leasing contracts",
  },
  Resource {
    name: "invoices",
    aliases: &["i", "invoice"],
    path: "/api/invoices",
    description: "Issued invoices",
  },
  Resource {
    name: "expenses",
    aliases: &["e", "expense"],
    path: "/api/expenses",
    description: "Logged vehicle expenses",
  },
  Resource {
    name: "dashboard",
    aliases: &["dash", "stats"],
    path: "/api/dashboard",
    description: "Dashboard aggregates",
  },
  Resource {
    name: "settings",
    aliases: &["s", "config"],
    path: "/api/settings",
    description: "Application settings",
  },
];

/// Resolve a resource from user input.
///
/// Exact name or alias matches win over prefix matches. Returns `None` for
/// unknown or ambiguous input.
pub fn find_resource(input: &str) -> Option<&'static Resource> {
  let input_lower = input.trim().to_lowercase();
  if input_lower.is_empty() {
    return None;
  }

  // Exact match on name or alias
  if let Some(resource) = RESOURCES
    .iter()
    .find(|r| r.name == input_lower || r.aliases.contains(&input_lower.as_str()))
  {
    return Some(resource);
  }

  // Unique prefix match on name
  let mut prefixed = RESOURCES.iter().filter(|r| r.name.starts_with(&input_lower));
  match (prefixed.next(), prefixed.next()) {
    (Some(resource), None) => Some(resource),
    _ => None,
  }
}

/// Names of all resources, for error messages.
pub fn resource_names() -> Vec<&'static str> {
  RESOURCES.iter().map(|r| r.name).collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::RoutePolicy;
  use reqwest::Method;

  #[test]
  fn test_exact_match() {
    assert_eq!(find_resource("vehicles").unwrap().path, "/api/vehicles");
  }

  #[test]
  fn test_alias_match() {
    assert_eq!(find_resource("d").unwrap().name, "drivers");
    assert_eq!(find_resource("Stats").unwrap().name, "dashboard");
  }

  #[test]
  fn test_prefix_match() {
    assert_eq!(find_resource("contr").unwrap().name, "contracts");
  }

  #[test]
  fn test_unknown_input() {
    assert!(find_resource("x").is_none());
    assert!(find_resource("").is_none());
  }

  #[test]
  fn test_every_resource_is_cacheable() {
    let policy = RoutePolicy::default();
    for resource in RESOURCES {
      assert!(policy.is_cacheable(resource.path, &Method::GET), "{}", resource.name);
    }
  }
}
