use aci_lang::values::{Day, DayOfWeek, TimeOfDay};
use aci_lang::{
    marshal_bind, marshal_target, BindKeyword, BindRule, Expression, Instruction, Operator,
    Permission, PermissionBindRuleItem, Rights, TargetKeyword, TargetRule, TargetRuleItem,
};
use anyhow::Context;
use serde::Deserialize;

/// Business-hours grant requested by an application team.
#[derive(Debug, Deserialize)]
pub struct Grant {
    pub label: String,
    pub rights: String,
    pub group: String,
    pub attributes: Vec<String>,
    pub weekdays_only: bool,
}

fn build(grant: &Grant) -> anyhow::Result<Instruction> {
    let mut targets = TargetRule::new();
    targets.push(TargetRuleItem::new(
        TargetKeyword::TargetAttr,
        Operator::Eq,
        marshal_target(TargetKeyword::TargetAttr, &[grant.attributes.join(" || ")])?,
    ));

    let mut bind_rule = BindRule::and([
        BindRule::item(
            BindKeyword::GroupDn,
            Operator::Eq,
            marshal_bind(BindKeyword::GroupDn, &grant.group)?,
        ),
        BindRule::item(
            BindKeyword::TimeOfDay,
            Operator::Ge,
            Expression::TimeOfDay(TimeOfDay::new(8, 0)?),
        ),
        BindRule::item(
            BindKeyword::TimeOfDay,
            Operator::Lt,
            Expression::TimeOfDay(TimeOfDay::new(18, 0)?),
        ),
    ]);
    if grant.weekdays_only {
        let mut weekend = DayOfWeek::new();
        weekend.shift(Day::Saturday).shift(Day::Sunday);
        bind_rule.push(BindRule::not(BindRule::item(
            BindKeyword::DayOfWeek,
            Operator::Eq,
            Expression::DayOfWeek(weekend),
        ))?)?;
    }

    let mut aci = Instruction::new(grant.label.as_str());
    aci.set_target_rule(targets).push(PermissionBindRuleItem::new(
        Permission::allow(Rights::parse(&grant.rights)?),
        bind_rule,
    ));
    aci.valid().context("generated instruction is not valid")?;
    Ok(aci)
}

fn main() -> anyhow::Result<()> {
    let payload = r#"{
        "label": "HR reads contact data during business hours",
        "rights": "read,search,compare",
        "group": "ldap:///cn=HR,ou=Groups,dc=example,dc=com",
        "attributes": ["cn", "mail", "telephoneNumber"],
        "weekdays_only": true
    }"#;
    let grant: Grant = serde_json::from_str(payload).context("malformed grant payload")?;

    let aci = build(&grant)?;
    let text = aci.to_string();
    println!("{text}");

    let reparsed = Instruction::parse(&text).context("canonical text failed to parse")?;
    anyhow::ensure!(reparsed == aci, "round trip changed the instruction");
    println!("{}", serde_json::to_string_pretty(&reparsed)?);

    Ok(())
}
