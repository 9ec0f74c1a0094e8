use super::*;
use crate::rules::errors::Error;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn bind(keyword: BindKeyword, raw: &str) -> Result<String> {
    marshal_bind(keyword, raw).map(|e| e.to_string())
}

fn target(keyword: TargetKeyword, raw: &[&str]) -> Result<Expression> {
    let raw = raw.iter().map(|s| s.to_string()).collect::<Vec<String>>();
    marshal_target(keyword, &raw)
}

fn failing_keyword(result: Result<impl std::fmt::Debug>) -> String {
    match result {
        Err(Error::InvalidValue { keyword, .. }) => keyword,
        other => panic!("expected an invalid value error, got {other:?}"),
    }
}

#[test]
fn dn_lists_prefix_scheme_and_dedupe() -> Result<()> {
    let expr = marshal_bind(
        BindKeyword::UserDn,
        "anyone || ldap:///uid=jdoe,ou=People,dc=example,dc=com || LDAP:///UID=JDOE,ou=People,dc=example,dc=com",
    )?;
    assert_eq!(
        expr.to_string(),
        "ldap:///anyone || ldap:///uid=jdoe,ou=People,dc=example,dc=com"
    );
    match &expr {
        Expression::DistinguishedNames(list) => {
            assert_eq!(list.len(), 2);
            assert!(list.contains_special(SpecialDn::Anyone));
            assert!(!list.contains_special(SpecialDn::SelfDn));
        }
        other => panic!("unexpected {other:?}"),
    }
    Ok(())
}

#[rstest]
#[case("ldap:///self")]
#[case("ldap:///parent")]
#[case("ldap:///all")]
#[case("ldap:///uid=*,ou=People,dc=example,dc=com")]
#[case("ldap:///ou=People,dc=example,dc=com??sub?(uid=jdoe)")]
#[case("ldap:///ou=People,dc=example,dc=com?cn,mail?one")]
fn canonical_dn_values_are_stable(#[case] raw: &str) {
    assert_eq!(bind(BindKeyword::GroupDn, raw), Ok(raw.to_string()));
}

#[test]
fn ldap_urls_are_bind_only() {
    let url = "ldap:///ou=People,dc=example,dc=com??sub?(uid=jdoe)";
    assert!(marshal_bind(BindKeyword::RoleDn, url).is_ok());
    assert_eq!(failing_keyword(target(TargetKeyword::Target, &[url])), "target");
}

#[rstest]
#[case("ldap:///uid=,dc=example")]
#[case("ldap:///nobody")]
#[case("ldap:///ou=People,dc=example,dc=com??sideways")]
fn rejects_malformed_dns(#[case] raw: &str) {
    assert!(marshal_bind(BindKeyword::UserDn, raw).is_err(), "{raw}");
}

#[rstest]
#[case(BindKeyword::UserDn, "userdn")]
#[case(BindKeyword::GroupDn, "groupdn")]
#[case(BindKeyword::RoleDn, "roledn")]
fn url_scope_errors_name_the_bind_keyword(#[case] keyword: BindKeyword, #[case] name: &str) {
    let raw = "ldap:///ou=People,dc=example,dc=com??sideways";
    assert_eq!(failing_keyword(marshal_bind(keyword, raw)), name);
}

#[rstest]
#[case("manager#USERDN", "manager#USERDN")]
#[case("owner#ldapurl", "owner#LDAPURL")]
#[case("departmentNumber#4612", "departmentNumber#4612")]
#[case("parent[0,1].manager#USERDN", "parent[0,1].manager#USERDN")]
#[case("PARENT[3,1].owner#groupdn", "parent[1,3].owner#GROUPDN")]
fn attribute_bind_values(#[case] raw: &str, #[case] rendered: &str) {
    assert_eq!(bind(BindKeyword::UserAttr, raw), Ok(rendered.to_string()));
}

#[rstest]
#[case("manager")]
#[case("manager#")]
#[case("parent[1].owner#LDAPURL")]
#[case("parent[1].owner#someValue")]
#[case("parent[12].owner#USERDN")]
#[case("parent[1]owner#USERDN")]
#[case("parent[1.owner#USERDN")]
fn rejects_attribute_bind_values(#[case] raw: &str) {
    assert_eq!(failing_keyword(marshal_bind(BindKeyword::GroupAttr, raw)), "groupattr");
}

#[test]
fn attribute_bind_carries_inheritance() -> Result<()> {
    match marshal_bind(BindKeyword::UserAttr, "parent[0,4].manager#SELFDN")? {
        Expression::AttributeBind(value) => {
            let levels = value.levels.expect("inheritance levels");
            assert_eq!(levels.levels(), vec![0, 4]);
            assert_eq!(value.attribute, "manager");
            assert_eq!(value.kind, BindTypeOrValue::BindType(BindType::SelfDn));
        }
        other => panic!("unexpected {other:?}"),
    }
    Ok(())
}

#[rstest]
#[case("Wed", "Wed")]
#[case("sun,Monday,3,thurs", "Sun,Mon,Tue,Thu")]
#[case("7,1", "Sun,Sat")]
#[case("friday, bogus", "Fri")]
fn day_of_week_values(#[case] raw: &str, #[case] rendered: &str) {
    assert_eq!(bind(BindKeyword::DayOfWeek, raw), Ok(rendered.to_string()));
}

#[rstest]
#[case("someday")]
#[case("0,8")]
fn rejects_day_of_week_values(#[case] raw: &str) {
    assert_eq!(failing_keyword(marshal_bind(BindKeyword::DayOfWeek, raw)), "dayofweek");
}

#[rstest]
#[case("0000")]
#[case("0930")]
#[case("2359")]
#[case("2400")]
fn time_of_day_values(#[case] raw: &str) {
    assert_eq!(bind(BindKeyword::TimeOfDay, raw), Ok(raw.to_string()));
}

#[rstest]
#[case("930")]
#[case("2401")]
#[case("1260")]
#[case("12:30")]
fn rejects_time_of_day_values(#[case] raw: &str) {
    assert_eq!(failing_keyword(marshal_bind(BindKeyword::TimeOfDay, raw)), "timeofday");
}

#[test]
fn end_of_day_is_distinct_from_midnight() -> Result<()> {
    let end = TimeOfDay::parse("2400")?;
    let midnight = TimeOfDay::parse("0000")?;
    assert_ne!(end, midnight);
    assert!(end.is_end_of_day());
    assert_eq!(midnight.value(), 0);
    Ok(())
}

#[test]
fn time_of_day_from_wall_clock() {
    use chrono::{NaiveTime, TimeZone, Utc};
    let time = NaiveTime::from_hms_opt(17, 45, 12).expect("valid time");
    assert_eq!(TimeOfDay::from_time(time).to_string(), "1745");
    let stamp = Utc.with_ymd_and_hms(2024, 3, 8, 6, 5, 0).unwrap();
    assert_eq!(TimeOfDay::from_datetime(&stamp).to_string(), "0605");
}

#[rstest]
#[case("71", 71)]
#[case("256", 256)]
#[case("1", 1)]
#[case("300", 256)]
#[case("full", 256)]
#[case("MAX", 256)]
#[case("0", 0)]
#[case("-12", 0)]
#[case("off", 0)]
#[case("none", 0)]
#[case("99999999999999999999", 256)]
#[case("+300", 256)]
#[case("-99999999999999999999", 0)]
fn security_strength_factor(#[case] raw: &str, #[case] expected: u16) {
    let ssf = SecurityStrengthFactor::parse(raw).unwrap();
    assert_eq!(ssf.value(), expected);
    assert_eq!(ssf.to_string(), expected.to_string());
}

#[test]
fn rejects_non_numeric_ssf() {
    assert_eq!(failing_keyword(marshal_bind(BindKeyword::Ssf, "strong")), "ssf");
}

#[rstest]
#[case("10.0.0.*", true)]
#[case("192.168.1.0/24,10.1.*", true)]
#[case("fe80::1", true)]
#[case("::ffff:10.0.0.1", true)]
#[case("10.0.0.x", false)]
#[case("host.example.com", false)]
fn ip_address_patterns(#[case] raw: &str, #[case] ok: bool) {
    assert_eq!(marshal_bind(BindKeyword::Ip, raw).is_ok(), ok, "{raw}");
}

#[test]
fn ip_lists_render_comma_joined() {
    assert_eq!(
        bind(BindKeyword::Ip, "10.0.0.1 , 10.0.0.1, 10.0.0.2"),
        Ok("10.0.0.1,10.0.0.2".to_string())
    );
}

#[rstest]
#[case("*.example.com", true)]
#[case("host-1.example.com,www.example.org", true)]
#[case("localhost", false)]
#[case("-bad.example.com", false)]
#[case("bad-.example.com", false)]
#[case("under_score.example.com", false)]
fn domain_names(#[case] raw: &str, #[case] ok: bool) {
    assert_eq!(marshal_bind(BindKeyword::Dns, raw).is_ok(), ok, "{raw}");
}

#[test]
fn domain_label_and_total_length_limits() {
    let label = "a".repeat(63);
    assert!(marshal_bind(BindKeyword::Dns, &format!("{label}.com")).is_ok());
    let long_label = "a".repeat(64);
    assert!(marshal_bind(BindKeyword::Dns, &format!("{long_label}.com")).is_err());
    let too_long = vec![label.as_str(); 5].join(".");
    assert!(too_long.len() > 253);
    assert!(marshal_bind(BindKeyword::Dns, &too_long).is_err());
}

#[rstest]
#[case("none", AuthMethod::None)]
#[case("Simple", AuthMethod::Simple)]
#[case("SSL", AuthMethod::Ssl)]
#[case("sasl", AuthMethod::Sasl)]
#[case("sasl   external", AuthMethod::SaslExternal)]
#[case("SASL DIGEST-MD5", AuthMethod::SaslDigestMd5)]
#[case("sasl gssapi", AuthMethod::SaslGssapi)]
fn authentication_methods(#[case] raw: &str, #[case] expected: AuthMethod) {
    assert_eq!(
        marshal_bind(BindKeyword::AuthMethod, raw),
        Ok(Expression::AuthMethod(expected))
    );
}

#[test]
fn rejects_unknown_authentication_method() {
    assert_eq!(failing_keyword(marshal_bind(BindKeyword::AuthMethod, "kerberos")), "authmethod");
}

#[test]
fn empty_values_name_their_keyword() {
    assert_eq!(failing_keyword(marshal_bind(BindKeyword::Ip, "   ")), "ip");
    assert_eq!(failing_keyword(target(TargetKeyword::TargetAttr, &[""])), "targetattr");
}

#[rstest]
#[case(&["*"], "*")]
#[case(&["cn || sn || uid"], "cn || sn || uid")]
#[case(&["cn", "CN", "mail;lang-en"], "cn || mail;lang-en")]
fn target_attribute_lists(#[case] raw: &[&str], #[case] rendered: &str) {
    assert_eq!(
        target(TargetKeyword::TargetAttr, raw).map(|e| e.to_string()),
        Ok(rendered.to_string())
    );
}

#[rstest]
#[case(&["* || cn"])]
#[case(&["cn || 9lives"])]
fn rejects_target_attribute_lists(#[case] raw: &[&str]) {
    assert!(target(TargetKeyword::TargetAttr, raw).is_err());
}

#[test]
fn object_identifier_lists_split_per_value() -> Result<()> {
    let expr = target(TargetKeyword::TargetControl, &["1.2.3.4", "5.6.7.8 || 1.2.3.4"])?;
    assert_eq!(expr.split_values(), vec!["1.2.3.4", "5.6.7.8"]);
    assert!(expr.fits_target(TargetKeyword::ExtOp));
    assert!(target(TargetKeyword::ExtOp, &["1.3.6.1.4.1.4203.1.11.1"]).is_ok());
    assert_eq!(failing_keyword(target(TargetKeyword::ExtOp, &["passwordModify"])), "extop");
    Ok(())
}

#[rstest]
#[case("base", SearchScope::Base)]
#[case("onelevel", SearchScope::OneLevel)]
#[case("subtree", SearchScope::Subtree)]
#[case("subordinate", SearchScope::Subordinate)]
fn target_scopes(#[case] raw: &str, #[case] expected: SearchScope) {
    let expr = target(TargetKeyword::TargetScope, &[raw]);
    assert_eq!(expr, Ok(Expression::Scope(expected)));
    assert_eq!(expected.to_string(), raw);
}

#[test]
fn single_valued_targets_reject_lists() {
    assert_eq!(
        failing_keyword(target(TargetKeyword::TargetScope, &["base", "subtree"])),
        "targetscope"
    );
    assert!(target(TargetKeyword::TargetFilter, &["(cn=a)", "(cn=b)"]).is_err());
}

#[test]
fn target_filters_delegate_to_filter_syntax() -> Result<()> {
    let expr = target(
        TargetKeyword::TargetFilter,
        &["(&(objectClass=employee)(objectClass=engineering))"],
    )?;
    assert_eq!(
        expr.to_string(),
        "(&(objectClass=employee)(objectClass=engineering))"
    );
    assert_eq!(
        failing_keyword(target(TargetKeyword::TargetFilter, &["(&(cn=a)"])),
        "targetfilter"
    );
    Ok(())
}

#[test]
fn attribute_filter_operations() -> Result<()> {
    let expr = target(
        TargetKeyword::TargetAttrFilters,
        &["add=mail:(mail=*@example.com) && cn:(cn=*),del=sn:(sn=x)"],
    )?;
    assert_eq!(
        expr.to_string(),
        "add=mail:(mail=*@example.com) && cn:(cn=*),delete=sn:(sn=x)"
    );
    match expr {
        Expression::AttributeFilters(ops) => {
            assert_eq!(ops.add.len(), 2);
            assert_eq!(ops.delete.len(), 1);
            assert_eq!(ops.delete[0].attribute, "sn");
        }
        other => panic!("unexpected {other:?}"),
    }
    Ok(())
}

#[rstest]
#[case("add=mail")]
#[case("modify=cn:(cn=a)")]
#[case("add=cn:(cn=a),add=sn:(sn=b)")]
#[case("add=cn:(cn=a")]
fn rejects_attribute_filter_operations(#[case] raw: &str) {
    assert_eq!(
        failing_keyword(target(TargetKeyword::TargetAttrFilters, &[raw])),
        "targattrfilters"
    );
}

#[test]
fn expressions_only_fit_their_keyword_family() -> Result<()> {
    let time = marshal_bind(BindKeyword::TimeOfDay, "1200")?;
    assert!(time.fits_bind(BindKeyword::TimeOfDay));
    assert!(!time.fits_bind(BindKeyword::Ssf));
    assert!(!time.fits_target(TargetKeyword::TargetScope));

    let dns = marshal_bind(BindKeyword::UserDn, "ldap:///uid=a,dc=example")?;
    assert!(dns.fits_bind(BindKeyword::GroupDn));
    assert!(dns.fits_target(TargetKeyword::TargetTo));

    let url = marshal_bind(BindKeyword::UserDn, "ldap:///dc=example??sub?(uid=a)")?;
    assert!(url.fits_bind(BindKeyword::UserDn));
    assert!(!url.fits_target(TargetKeyword::Target));
    Ok(())
}

#[test]
fn day_and_level_bitsets_are_idempotent() {
    let mut days = DayOfWeek::new();
    days.shift(Day::Monday).shift(Day::Monday);
    assert_eq!(days.days(), vec![Day::Monday]);
    days.unshift(Day::Monday);
    assert_eq!(days, DayOfWeek::new());

    let mut levels = InheritanceLevels::new();
    levels.shift(2).shift(InheritanceLevels::MAX_LEVEL + 1);
    assert_eq!(levels.levels(), vec![2]);
    assert!(levels.positive(2));
    levels.unshift(2);
    assert!(levels.is_empty());
}
