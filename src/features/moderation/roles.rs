use crate::platform::RoleInfo;

/// Case-sensitive lookup, matching how role names are shown in the client
pub fn find_role<'a>(roles: &'a [RoleInfo], name: &str) -> Option<&'a RoleInfo> {
    roles.iter().find(|r| r.name == name)
}

/// Whether any of `held` grants the named role's privileges
pub fn holds_role(held: &[String], name: &str) -> bool {
    held.iter().any(|r| r == name)
}
