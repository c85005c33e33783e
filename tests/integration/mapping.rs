// tests/integration/mapping.rs

use crate::common::sample_store;
use posix_ldap_sync::config::{MappingConfig, ShadowPolicy};
use posix_ldap_sync::directory_service::build_entries;
use posix_ldap_sync::models::{AccountRecord, DerivedName, PasswordHash, account_dn, map_entry};
use posix_ldap_sync::AccountFilter;

fn ana() -> AccountRecord {
    AccountRecord {
        login_name: "ana".to_string(),
        numeric_id: 1000,
        group_id: 1000,
        gecos: "Ana García,,,".to_string(),
        credential_hash: PasswordHash::crypt("$6$xyz$anahash"),
        login_shell: "/bin/bash".to_string(),
        home_directory: "/home/ana".to_string(),
    }
}

#[test]
fn test_full_attribute_set_in_order() {
    let account = ana();
    let derived = DerivedName::derive(&account.gecos, &account.login_name);
    let entry = map_entry(&account, account.credential_hash.as_ref(), &derived, &MappingConfig::default());

    assert_eq!(entry.dn, "uid=ana,ou=usuarios,dc=aso,dc=local");

    let names: Vec<&str> = entry.attributes.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(
        names,
        [
            "objectClass", "uid", "sn", "givenName", "cn", "displayName", "uidNumber",
            "gidNumber", "userPassword", "gecos", "loginShell", "homeDirectory",
            "shadowExpire", "shadowFlag", "shadowWarning", "shadowMin", "shadowMax",
            "shadowLastChange", "mail", "postalCode", "o", "initials",
        ]
    );

    assert_eq!(entry.values("objectClass"), ["inetOrgPerson", "posixAccount", "shadowAccount"]);
    assert_eq!(entry.first("uid"), Some("ana"));
    assert_eq!(entry.first("sn"), Some("García"));
    assert_eq!(entry.first("givenName"), Some("Ana"));
    assert_eq!(entry.first("cn"), Some("Ana García"));
    assert_eq!(entry.first("displayName"), Some("Ana García"));
    assert_eq!(entry.first("gecos"), Some("Ana García"));
    assert_eq!(entry.first("uidNumber"), Some("1000"));
    assert_eq!(entry.first("gidNumber"), Some("10000"));
    assert_eq!(entry.first("userPassword"), Some("{crypt}$6$xyz$anahash"));
    assert_eq!(entry.first("loginShell"), Some("/bin/bash"));
    assert_eq!(entry.first("homeDirectory"), Some("/home/ana"));
    assert_eq!(entry.first("shadowExpire"), Some("-1"));
    assert_eq!(entry.first("shadowFlag"), Some("0"));
    assert_eq!(entry.first("shadowWarning"), Some("7"));
    assert_eq!(entry.first("shadowMin"), Some("8"));
    assert_eq!(entry.first("shadowMax"), Some("999999"));
    assert_eq!(entry.first("shadowLastChange"), Some("10877"));
    assert_eq!(entry.first("mail"), Some("ana@aso.local"));
    assert_eq!(entry.first("postalCode"), Some("29000"));
    assert_eq!(entry.first("o"), Some("aso"));
    assert_eq!(entry.first("initials"), Some("AG"));
}

#[test]
fn test_absent_credential_omits_user_password() {
    let mut account = ana();
    account.credential_hash = None;
    let derived = DerivedName::derive(&account.gecos, &account.login_name);
    let entry = map_entry(&account, None, &derived, &MappingConfig::default());

    assert!(!entry.contains("userPassword"));
    assert_eq!(entry.attributes.len(), 21);
}

#[test]
fn test_empty_hash_is_not_a_credential() {
    assert!(PasswordHash::crypt("").is_none());
}

#[test]
fn test_configured_values_flow_into_entry() {
    let mapping = MappingConfig {
        base_dn: "ou=people,dc=example,dc=org".to_string(),
        mail_domain: "example.org".to_string(),
        gid_number: 5000,
        organization: "Example".to_string(),
        postal_code: "08001".to_string(),
        shadow: ShadowPolicy {
            max: 90,
            last_change: 19500,
            ..ShadowPolicy::default()
        },
    };
    let account = ana();
    let derived = DerivedName::derive(&account.gecos, &account.login_name);
    let entry = map_entry(&account, None, &derived, &mapping);

    assert_eq!(entry.dn, "uid=ana,ou=people,dc=example,dc=org");
    assert_eq!(entry.first("mail"), Some("ana@example.org"));
    assert_eq!(entry.first("gidNumber"), Some("5000"));
    assert_eq!(entry.first("o"), Some("Example"));
    assert_eq!(entry.first("postalCode"), Some("08001"));
    assert_eq!(entry.first("shadowMax"), Some("90"));
    assert_eq!(entry.first("shadowLastChange"), Some("19500"));
    assert_eq!(entry.first("shadowMin"), Some("8"));
}

#[test]
fn test_mail_is_uid_at_domain_for_every_entry() {
    let store = sample_store();
    let mapping = MappingConfig::default();
    let (entries, _) = build_entries(&store, &AccountFilter::default(), &mapping);
    assert!(!entries.is_empty());
    for entry in &entries {
        assert_eq!(
            entry.first("mail").unwrap(),
            format!("{}@{}", entry.uid(), mapping.mail_domain)
        );
        assert!(!entry.uid().is_empty());
        assert!(!entry.first("sn").unwrap().is_empty());
        assert!(!entry.first("givenName").unwrap().is_empty());
    }
}

#[test]
fn test_self_referential_names_for_empty_gecos() {
    let store = sample_store();
    let (entries, _) = build_entries(&store, &AccountFilter::default(), &MappingConfig::default());
    let jdoe = entries.iter().find(|e| e.uid() == "jdoe").unwrap();
    assert_eq!(jdoe.first("sn"), Some("jdoe"));
    assert_eq!(jdoe.first("givenName"), Some("jdoe"));
    assert_eq!(jdoe.first("cn"), Some("jdoe"));
    assert_eq!(jdoe.first("initials"), Some("jj"));
    assert!(!jdoe.contains("userPassword"));
}

#[test]
fn test_dn_escapes_special_characters() {
    assert_eq!(account_dn("ana", "ou=u,dc=x"), "uid=ana,ou=u,dc=x");
    assert_eq!(account_dn("a,b", "ou=u,dc=x"), "uid=a\\,b,ou=u,dc=x");
    assert_eq!(account_dn("#x", "ou=u,dc=x"), "uid=\\#x,ou=u,dc=x");
    assert_eq!(account_dn("a\0b", "ou=u,dc=x"), "uid=a\\00b,ou=u,dc=x");
}
