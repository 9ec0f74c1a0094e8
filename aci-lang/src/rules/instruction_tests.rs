use super::*;
use crate::rules::keywords::{BindKeyword, Operator, TargetKeyword};
use crate::rules::permission::{Right, Rights};
use crate::rules::target_rule::TargetRuleItem;
use crate::rules::values::{marshal_bind, marshal_target};
use indoc::indoc;
use pretty_assertions::assert_eq;
use rstest::rstest;

const EMPLOYEE_ACI: &str = r#"(targetfilter = "(&(objectClass=employee)(objectClass=engineering))")(targetcontrol = "1.2.3.4" || "5.6.7.8")(targetscope = "onelevel")(version 3.0; acl "Allow read and write..."; allow(read,write) (((userdn = "ldap:///anyone") AND (ssf >= "71")) AND NOT (dayofweek = "Wed" OR dayofweek = "Fri"));)"#;

fn item(keyword: BindKeyword, operator: Operator, raw: &str) -> BindRule {
    BindRule::item(keyword, operator, marshal_bind(keyword, raw).unwrap())
}

fn target(keyword: TargetKeyword, operator: Operator, values: &[&str]) -> TargetRuleItem {
    let values = values.iter().map(|v| v.to_string()).collect::<Vec<String>>();
    TargetRuleItem::new(keyword, operator, marshal_target(keyword, &values).unwrap())
}

#[test]
fn parses_the_employee_instruction() -> Result<()> {
    let aci = Instruction::parse(EMPLOYEE_ACI)?;
    assert_eq!(aci.acl, "Allow read and write...");
    assert_eq!(aci.target_rule.as_ref().map(TargetRule::len), Some(3));
    assert_eq!(aci.permission_bind_rule.len(), 1);

    let pbr = aci.permission_bind_rule.iter().next().unwrap();
    assert_eq!(pbr.permission, Permission::allow(Rights::from_iter([Right::Read, Right::Write])));
    let operands = match &pbr.bind_rule {
        BindRule::And { operands, .. } => operands,
        other => panic!("expected AND, got {other:?}"),
    };
    assert_eq!(operands.len(), 2);
    match &operands[1] {
        BindRule::Not(inner) => match inner.as_ref() {
            BindRule::Or { operands, .. } => {
                assert_eq!(operands.len(), 2);
                assert!(operands.iter().all(|o| matches!(o, BindRule::Item(_))));
            }
            other => panic!("expected OR under NOT, got {other:?}"),
        },
        other => panic!("expected NOT, got {other:?}"),
    }

    assert!(aci.valid().is_ok());
    assert_eq!(aci.to_string(), EMPLOYEE_ACI);
    Ok(())
}

#[test]
fn builds_the_employee_instruction() -> Result<()> {
    let mut targets = TargetRule::new();
    targets
        .push(target(
            TargetKeyword::TargetFilter,
            Operator::Eq,
            &["(&(objectClass=employee)(objectClass=engineering))"],
        ))
        .push(target(TargetKeyword::TargetControl, Operator::Eq, &["1.2.3.4", "5.6.7.8"]))
        .push(target(TargetKeyword::TargetScope, Operator::Eq, &["onelevel"]));

    let bind_rule = BindRule::and([
        BindRule::and([
            item(BindKeyword::UserDn, Operator::Eq, "ldap:///anyone").paren(),
            item(BindKeyword::Ssf, Operator::Ge, "71").paren(),
        ])
        .paren(),
        BindRule::not(
            BindRule::or([
                item(BindKeyword::DayOfWeek, Operator::Eq, "Wed"),
                item(BindKeyword::DayOfWeek, Operator::Eq, "Fri"),
            ])
            .paren(),
        )?,
    ])
    .paren();

    let mut aci = Instruction::new("Allow read and write...");
    aci.set_target_rule(targets).push(PermissionBindRuleItem::new(
        Permission::allow(Rights::from_iter([Right::Write, Right::Read])),
        bind_rule,
    ));

    assert!(aci.valid().is_ok());
    assert_eq!(aci.to_string(), EMPLOYEE_ACI);
    assert_eq!(Instruction::parse(EMPLOYEE_ACI)?, aci);
    Ok(())
}

#[test]
fn target_rule_is_optional() -> Result<()> {
    let aci = Instruction::parse(
        r#"(version 3.0; acl "anonymous read"; allow(read,search,compare) userdn = "ldap:///anyone";)"#,
    )?;
    assert!(aci.target_rule.is_none());
    assert_eq!(
        aci.to_string(),
        r#"(version 3.0; acl "anonymous read"; allow(read,search,compare) userdn = "ldap:///anyone";)"#
    );
    Ok(())
}

#[test]
fn multiple_permission_bind_rules() -> Result<()> {
    let text = indoc! {r#"
        (targetattr = "*")
        (version 3.0;
          acl "self service";
          allow(read,search) userdn = "ldap:///self";
          deny(write) userdn = "ldap:///self" AND timeofday < "0800";
        )"#};
    let aci = Instruction::parse(text)?;
    assert_eq!(aci.permission_bind_rule.len(), 2);
    assert_eq!(
        aci.to_string(),
        r#"(targetattr = "*")(version 3.0; acl "self service"; allow(read,search) userdn = "ldap:///self"; deny(write) userdn = "ldap:///self" AND timeofday < "0800";)"#
    );
    Ok(())
}

#[rstest]
#[case(r#"(version 3.0; acl "a"; allow(read) userdn = "ldap:///anyone")"#)]
#[case(r#"(VERSION 3.0; ACL "a"; allow(read) userdn = "ldap:///anyone";)"#)]
#[case(r#"  (version 3.0;acl"a";allow(read) userdn = "ldap:///anyone";  )  "#)]
fn lenient_spacing_and_terminator(#[case] text: &str) {
    assert_eq!(
        Instruction::parse(text).unwrap().to_string(),
        r#"(version 3.0; acl "a"; allow(read) userdn = "ldap:///anyone";)"#
    );
}

#[test]
fn semicolons_inside_quoted_values_do_not_split() -> Result<()> {
    let aci = Instruction::parse(
        r#"(version 3.0; acl "a;b"; allow(read) userdn = "ldap:///cn=x\;y,dc=example,dc=com";)"#,
    )?;
    assert_eq!(aci.acl, "a;b");
    assert_eq!(aci.permission_bind_rule.len(), 1);
    Ok(())
}

#[rstest]
#[case(r#"(acl "a"; allow(read) userdn = "ldap:///anyone";)"#)]
#[case(r#"(targetattr = "*")version 3.0; acl "a"; allow(read) userdn = "ldap:///anyone";)"#)]
#[case(r#"(version 3.0; "a"; allow(read) userdn = "ldap:///anyone";)"#)]
#[case(r#"(version 3.0; acl a; allow(read) userdn = "ldap:///anyone";)"#)]
#[case(r#"(version 3.0; acl "a; allow(read) userdn = "ldap:///anyone";)"#)]
#[case(r#"(version 3.0; acl "a" allow(read) userdn = "ldap:///anyone";)"#)]
#[case(r#"(version 3.0; acl "a"; allow(read) userdn = "ldap:///anyone";"#)]
#[case(r#"(version 3.0; acl "a";)"#)]
#[case(r#"(version 3.0; acl "a"; userdn = "ldap:///anyone";)"#)]
fn structural_errors(#[case] text: &str) {
    let err = Instruction::parse(text).unwrap_err();
    assert!(matches!(err, Error::ParseError(_)), "{text}: {err}");
}

#[test]
fn empty_label_is_rejected() {
    assert!(matches!(
        Instruction::parse(r#"(version 3.0; acl ""; allow(read) userdn = "ldap:///anyone";)"#),
        Err(Error::ValidationError(_))
    ));
}

#[test]
fn component_errors_propagate() {
    assert_eq!(
        Instruction::parse(r#"(targetname = "x")(version 3.0; acl "a"; allow(read) userdn = "ldap:///anyone";)"#),
        Err(Error::UnknownKeyword("targetname".to_string()))
    );
    assert_eq!(
        Instruction::parse(r#"(version 3.0; acl "a"; allow(modify) userdn = "ldap:///anyone";)"#),
        Err(Error::UnknownRight("modify".to_string()))
    );
    assert_eq!(
        Instruction::parse(r#"(version 3.0; acl "a"; allow(read) owner = "ldap:///anyone";)"#),
        Err(Error::UnknownKeyword("owner".to_string()))
    );
}

#[test]
fn validation_aggregates_component_findings() {
    let mut aci = Instruction::new("");
    aci.push(PermissionBindRuleItem::new(
        Permission::allow(Right::Read),
        item(BindKeyword::UserDn, Operator::Gt, "ldap:///anyone"),
    ));
    match aci.valid() {
        Err(Error::Errors(errors)) => assert_eq!(errors.0.len(), 2),
        other => panic!("expected aggregated errors, got {other:?}"),
    }

    let empty = Instruction::new("nothing granted");
    assert!(matches!(empty.valid(), Err(Error::ValidationError(_))));
}

#[test]
fn unescaped_quote_in_label_fails_validation() {
    let mut aci = Instruction::new(r#"say "hi""#);
    aci.push(PermissionBindRuleItem::new(
        Permission::allow(Right::Read),
        item(BindKeyword::UserDn, Operator::Eq, "ldap:///anyone"),
    ));
    assert!(matches!(aci.valid(), Err(Error::ValidationError(_))));
    aci.set_acl(r#"say \"hi\""#);
    assert!(aci.valid().is_ok());
}

#[test]
fn nesting_limit_applies_to_bind_rules() {
    let text = r#"(version 3.0; acl "a"; allow(read) (((userdn = "ldap:///anyone")));)"#;
    let shallow = ParseOptions::default().with_max_nesting_depth(2);
    assert!(matches!(
        Instruction::parse_with(text, &shallow),
        Err(Error::ParseError(_))
    ));
    assert!(Instruction::parse(text).is_ok());
}

#[test]
fn from_str_matches_parse() -> Result<()> {
    let aci: Instruction = EMPLOYEE_ACI.parse()?;
    assert_eq!(aci, Instruction::try_from(EMPLOYEE_ACI)?);
    Ok(())
}

#[test]
fn syntax_errors_are_told_apart_from_semantic_ones() {
    let structural = Instruction::parse(r#"(version 3.0; acl "a"; allow(read) (userdn = "ldap:///anyone";)"#)
        .unwrap_err();
    assert!(structural.is_syntax(), "{structural}");
    let semantic = Instruction::parse(r#"(version 3.0; acl "a"; allow(read) ssf = "strong";)"#)
        .unwrap_err();
    assert!(!semantic.is_syntax(), "{semantic}");
}
