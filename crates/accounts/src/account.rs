use serde::{Deserialize, Serialize};

use dokon_core::DomainError;

/// The two core admin identities. They can never be edited or deleted, and
/// their capabilities are implicitly all-true regardless of what the stored
/// account rows say.
pub const PROTECTED_USERNAMES: [&str; 2] = ["admin", "boss"];

/// Account username: the unique, case-insensitive key of an account.
///
/// The original casing is preserved for display; all comparisons go through
/// [`Username::matches`]. Usernames are ASCII in practice (they double as
/// storage keys), so case folding is ASCII-only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("username cannot be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive key comparison.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other.trim())
    }
}

impl core::fmt::Display for Username {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Capability granted to an account, one per permission flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    CreditsManage,
    WholesaleAllowed,
    AddProducts,
    ManageAccounts,
}

/// Fixed-field capability set.
///
/// A deliberate replacement for the historical string-keyed permission map:
/// field names are checked at compile time and `allows` is exhaustive over
/// [`Capability`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PermissionSet {
    pub credits_manage: bool,
    pub wholesale_allowed: bool,
    pub add_products: bool,
    pub manage_accounts: bool,
}

impl PermissionSet {
    /// All capabilities granted (the protected-account set).
    pub fn all() -> Self {
        Self {
            credits_manage: true,
            wholesale_allowed: true,
            add_products: true,
            manage_accounts: true,
        }
    }

    /// No capabilities granted (the default for unknown usernames).
    pub fn none() -> Self {
        Self::default()
    }

    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::CreditsManage => self.credits_manage,
            Capability::WholesaleAllowed => self.wholesale_allowed,
            Capability::AddProducts => self.add_products,
            Capability::ManageAccounts => self.manage_accounts,
        }
    }
}

/// A shop account: username key, display label, capability flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub username: Username,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub permissions: PermissionSet,
}

/// Shallow patch for an account. The username is the identity and is never
/// patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountPatch {
    pub label: Option<String>,
    pub permissions: Option<PermissionSet>,
}

impl Account {
    pub fn apply_patch(&mut self, patch: &AccountPatch) {
        if let Some(label) = &patch.label {
            self.label = label.clone();
        }
        if let Some(permissions) = patch.permissions {
            self.permissions = permissions;
        }
    }
}

/// Whether a username is one of the hard-coded protected admin identities.
pub fn is_protected(username: &str) -> bool {
    PROTECTED_USERNAMES
        .iter()
        .any(|p| p.eq_ignore_ascii_case(username.trim()))
}

/// Look up an account by username, case-insensitively.
pub fn find<'a>(accounts: &'a [Account], username: &str) -> Option<&'a Account> {
    accounts.iter().find(|a| a.username.matches(username))
}

/// Resolve the effective capability set for a username.
///
/// Protected usernames always resolve to all-true, whether or not an account
/// row exists for them. Unknown usernames resolve to all-false.
pub fn capabilities(accounts: &[Account], username: &str) -> PermissionSet {
    if is_protected(username) {
        return PermissionSet::all();
    }
    find(accounts, username)
        .map(|a| a.permissions)
        .unwrap_or_else(PermissionSet::none)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(username: &str, permissions: PermissionSet) -> Account {
        Account {
            username: Username::new(username).unwrap(),
            label: username.to_string(),
            permissions,
        }
    }

    #[test]
    fn username_rejects_empty() {
        assert!(Username::new("   ").is_err());
        assert!(Username::new("aziza").is_ok());
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let accounts = vec![account("Aziza", PermissionSet::none())];
        assert!(find(&accounts, "aziza").is_some());
        assert!(find(&accounts, " AZIZA ").is_some());
        assert!(find(&accounts, "karim").is_none());
    }

    #[test]
    fn protected_usernames_always_have_all_capabilities() {
        // Even with no stored row, and regardless of casing.
        let accounts: Vec<Account> = Vec::new();
        assert_eq!(capabilities(&accounts, "admin"), PermissionSet::all());
        assert_eq!(capabilities(&accounts, "Boss"), PermissionSet::all());
    }

    #[test]
    fn unknown_usernames_have_no_capabilities() {
        let accounts = vec![account("aziza", PermissionSet::all())];
        assert_eq!(capabilities(&accounts, "karim"), PermissionSet::none());
    }

    #[test]
    fn granted_flags_resolve_per_account() {
        let perms = PermissionSet {
            wholesale_allowed: true,
            ..PermissionSet::none()
        };
        let accounts = vec![account("aziza", perms)];

        let effective = capabilities(&accounts, "aziza");
        assert!(effective.allows(Capability::WholesaleAllowed));
        assert!(!effective.allows(Capability::CreditsManage));
        assert!(!effective.allows(Capability::ManageAccounts));
    }

    #[test]
    fn patch_updates_label_and_permissions_only() {
        let mut acc = account("aziza", PermissionSet::none());
        acc.apply_patch(&AccountPatch {
            label: Some("Aziza (kassir)".to_string()),
            permissions: Some(PermissionSet::all()),
        });
        assert_eq!(acc.label, "Aziza (kassir)");
        assert_eq!(acc.permissions, PermissionSet::all());
        assert_eq!(acc.username.as_str(), "aziza");
    }

    #[test]
    fn permissions_default_to_false_in_documents() {
        let acc: Account = serde_json::from_str(r#"{"username":"karim"}"#).unwrap();
        assert_eq!(acc.permissions, PermissionSet::none());
    }
}
