use crate::tasks::decode::{DecodeContext, attribute};
use crate::tasks::error::TaskError;
use crate::tasks::schemas::{write_opt_text, write_text};
use crate::tasks::values;
use common::tasks::{
    LogonType, OneOrMany, Principal, Principals, Privilege, ProcessTokenSidType,
    RequiredPrivileges, RunLevel,
};
use quick_xml::Writer;
use serde_json::Value;
use std::io;

/// Decode the Principals wrapper. The schema mandates it even for one principal.
pub(crate) fn decode_principals(
    ctx: &DecodeContext,
    node: Option<&Value>,
) -> Result<Option<Principals>, TaskError> {
    let Some(map) = ctx.object(node, "Principals")? else {
        return Ok(None);
    };

    // A repeated Principal element keeps only the first entry
    let entry = match map.get("Principal") {
        Some(Value::Array(entries)) => entries.first(),
        other => other,
    };
    let principal = decode_principal(ctx, entry)?;
    Ok(principal.map(|principal| Principals {
        principal: Some(principal),
    }))
}

fn decode_principal(
    ctx: &DecodeContext,
    node: Option<&Value>,
) -> Result<Option<Principal>, TaskError> {
    let Some(map) = ctx.object(node, "Principals.Principal")? else {
        return Ok(None);
    };

    let principal = Principal {
        id: ctx.string(
            attribute(map, "id").or_else(|| map.get("Id")),
            "Principals.Principal.Id",
        )?,
        user_id: ctx.string(map.get("UserId"), "Principals.Principal.UserId")?,
        logon_type: ctx.enum_value(
            map.get("LogonType"),
            "Principals.Principal.LogonType",
            LogonType::from_name,
            LogonType::VALUES,
        )?,
        group_id: ctx.string(map.get("GroupId"), "Principals.Principal.GroupId")?,
        display_name: ctx.string(map.get("DisplayName"), "Principals.Principal.DisplayName")?,
        run_level: ctx.enum_value(
            map.get("RunLevel"),
            "Principals.Principal.RunLevel",
            RunLevel::from_name,
            RunLevel::VALUES,
        )?,
        process_token_sid_type: ctx.enum_value(
            map.get("ProcessTokenSidType"),
            "Principals.Principal.ProcessTokenSidType",
            ProcessTokenSidType::from_name,
            ProcessTokenSidType::VALUES,
        )?,
        required_privileges: decode_required_privileges(ctx, map.get("RequiredPrivileges"))?,
    };

    Ok((principal != Principal::default()).then_some(principal))
}

fn decode_required_privileges(
    ctx: &DecodeContext,
    node: Option<&Value>,
) -> Result<Option<RequiredPrivileges>, TaskError> {
    let Some(map) = ctx.object(node, "Principals.Principal.RequiredPrivileges")? else {
        return Ok(None);
    };

    let mut privileges = Vec::new();
    for entry in values::to_array(map.get("Privilege")) {
        if let Some(privilege) = ctx.enum_value(
            Some(entry),
            "Principals.Principal.RequiredPrivileges.Privilege",
            Privilege::from_name,
            Privilege::VALUES,
        )? {
            privileges.push(privilege);
        }
    }
    Ok(OneOrMany::from_vec(privileges).map(|privilege| RequiredPrivileges { privilege }))
}

pub(crate) fn write_principals(
    writer: &mut Writer<Vec<u8>>,
    principals: &Principals,
) -> io::Result<()> {
    writer
        .create_element("Principals")
        .write_inner_content(|writer| {
            if let Some(principal) = &principals.principal {
                write_principal(writer, principal)?;
            }
            Ok(())
        })?;
    Ok(())
}

fn write_principal(writer: &mut Writer<Vec<u8>>, principal: &Principal) -> io::Result<()> {
    let mut element = writer.create_element("Principal");
    if let Some(id) = principal.id.as_deref() {
        element = element.with_attribute(("id", id));
    }
    element.write_inner_content(|writer| {
        write_opt_text(writer, "UserId", principal.user_id.as_deref())?;
        write_opt_text(writer, "GroupId", principal.group_id.as_deref())?;
        write_opt_text(writer, "DisplayName", principal.display_name.as_deref())?;
        if let Some(logon_type) = principal.logon_type {
            write_text(writer, "LogonType", logon_type.as_name())?;
        }
        if let Some(run_level) = principal.run_level {
            write_text(writer, "RunLevel", run_level.as_name())?;
        }
        if let Some(sid_type) = principal.process_token_sid_type {
            write_text(writer, "ProcessTokenSidType", sid_type.as_name())?;
        }
        if let Some(privileges) = &principal.required_privileges {
            writer
                .create_element("RequiredPrivileges")
                .write_inner_content(|writer| {
                    for privilege in privileges.privilege.iter() {
                        write_text(writer, "Privilege", privilege.as_name())?;
                    }
                    Ok(())
                })?;
        }
        Ok(())
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{decode_principals, write_principals};
    use crate::tasks::decode::DecodeContext;
    use common::tasks::{
        LogonType, OneOrMany, Principal, Principals, Privilege, RequiredPrivileges, RunLevel,
    };
    use quick_xml::Writer;
    use serde_json::json;

    #[test]
    fn test_decode_principal() {
        let ctx = DecodeContext { strict: false };
        let node = json!({"Principal": {
            "$": {"id": "Author"},
            "UserId": "S-1-5-18",
            "LogonType": "Password",
            "RunLevel": "HighestAvailable",
            "RequiredPrivileges": {"Privilege": ["SeBackupPrivilege", "SeRestorePrivilege"]}
        }});
        let principals = decode_principals(&ctx, Some(&node)).unwrap().unwrap();
        let principal = principals.principal.unwrap();
        assert_eq!(principal.id.as_deref(), Some("Author"));
        assert_eq!(principal.logon_type, Some(LogonType::Password));
        assert_eq!(principal.run_level, Some(RunLevel::HighestAvailable));
        assert_eq!(
            principal.required_privileges.unwrap().privilege,
            OneOrMany::Many(vec![Privilege::SeBackupPrivilege, Privilege::SeRestorePrivilege])
        );
    }

    #[test]
    fn test_decode_principal_lenient_drops_unknown_privilege() {
        let ctx = DecodeContext { strict: false };
        let node = json!({"Principal": {
            "UserId": "alice",
            "RequiredPrivileges": {"Privilege": ["SeRootPrivilege", "SeDebugPrivilege"]}
        }});
        let principals = decode_principals(&ctx, Some(&node)).unwrap().unwrap();
        let principal = principals.principal.unwrap();
        assert_eq!(
            principal.required_privileges.unwrap().privilege,
            OneOrMany::One(Privilege::SeDebugPrivilege)
        );
    }

    #[test]
    fn test_decode_empty_principals_omitted() {
        let ctx = DecodeContext { strict: false };
        let node = json!({});
        assert!(decode_principals(&ctx, Some(&node)).unwrap().is_none());
    }

    #[test]
    fn test_write_principal() {
        let principals = Principals {
            principal: Some(Principal {
                id: Some(String::from("Author")),
                user_id: Some(String::from("S-1-5-18")),
                logon_type: Some(LogonType::S4U),
                required_privileges: Some(RequiredPrivileges {
                    privilege: OneOrMany::One(Privilege::SeDebugPrivilege),
                }),
                ..Default::default()
            }),
        };
        let mut writer = Writer::new(Vec::new());
        write_principals(&mut writer, &principals).unwrap();
        let xml = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(
            xml,
            "<Principals><Principal id=\"Author\"><UserId>S-1-5-18</UserId>\
             <LogonType>S4U</LogonType><RequiredPrivileges>\
             <Privilege>SeDebugPrivilege</Privilege></RequiredPrivileges>\
             </Principal></Principals>"
        );
    }
}
