use crate::tasks::decode::{DecodeContext, attribute};
use crate::tasks::error::TaskError;
use crate::tasks::schemas::{
    write_opt_one_or_many, write_opt_text, write_text, write_value,
};
use crate::tasks::values;
use common::tasks::{
    Actions, Attachments, ComHandlerAction, ExecAction, HeaderField, HeaderFields, OneOrMany,
    SendEmailAction,
};
use quick_xml::Writer;
use serde_json::{Map, Value};
use std::io;

/// Decode the Actions section: the shared context plus one list per kind.
pub(crate) fn decode_actions(
    ctx: &DecodeContext,
    node: Option<&Value>,
) -> Result<Option<Actions>, TaskError> {
    let Some(map) = ctx.object(node, "Actions")? else {
        return Ok(None);
    };

    let mut actions = Actions {
        // Context is an attribute on the wire; a child element is accepted too
        context: ctx.string(
            attribute(map, "Context").or_else(|| map.get("Context")),
            "Actions.Context",
        )?,
        ..Default::default()
    };

    for entry in values::to_array(map.get("Exec")) {
        if let Some(entry) = ctx.object(Some(entry), "Actions.Exec")? {
            if let Some(exec) = decode_exec(ctx, entry)? {
                actions.exec.push(exec);
            }
        }
    }
    for entry in values::to_array(map.get("ComHandler")) {
        if let Some(entry) = ctx.object(Some(entry), "Actions.ComHandler")? {
            if let Some(com_handler) = decode_com_handler(ctx, entry)? {
                actions.com_handler.push(com_handler);
            }
        }
    }
    for entry in values::to_array(map.get("SendEmail")) {
        if let Some(entry) = ctx.object(Some(entry), "Actions.SendEmail")? {
            if let Some(send_email) = decode_send_email(ctx, entry)? {
                actions.send_email.push(send_email);
            }
        }
    }

    Ok((actions != Actions::default()).then_some(actions))
}

fn decode_exec(
    ctx: &DecodeContext,
    map: &Map<String, Value>,
) -> Result<Option<ExecAction>, TaskError> {
    let Some(command) = ctx.string(map.get("Command"), "Actions.Exec.Command")? else {
        return ctx.missing("Actions.Exec.Command");
    };
    Ok(Some(ExecAction {
        id: ctx.string(attribute(map, "id"), "Actions.Exec.Id")?,
        command,
        arguments: ctx.string_one_or_many(map.get("Arguments"), "Actions.Exec.Arguments")?,
        working_directory: ctx.string_one_or_many(
            map.get("WorkingDirectory"),
            "Actions.Exec.WorkingDirectory",
        )?,
    }))
}

fn decode_com_handler(
    ctx: &DecodeContext,
    map: &Map<String, Value>,
) -> Result<Option<ComHandlerAction>, TaskError> {
    let Some(class_id) = ctx.string(map.get("ClassId"), "Actions.ComHandler.ClassId")? else {
        return ctx.missing("Actions.ComHandler.ClassId");
    };
    Ok(Some(ComHandlerAction {
        class_id,
        data: map.get("Data").cloned(),
    }))
}

fn decode_send_email(
    ctx: &DecodeContext,
    map: &Map<String, Value>,
) -> Result<Option<SendEmailAction>, TaskError> {
    let Some(server) = ctx.string(map.get("Server"), "Actions.SendEmail.Server")? else {
        return ctx.missing("Actions.SendEmail.Server");
    };
    let Some(subject) = ctx.string(map.get("Subject"), "Actions.SendEmail.Subject")? else {
        return ctx.missing("Actions.SendEmail.Subject");
    };
    let Some(to) = ctx.string(map.get("To"), "Actions.SendEmail.To")? else {
        return ctx.missing("Actions.SendEmail.To");
    };
    let Some(from) = ctx.string(map.get("From"), "Actions.SendEmail.From")? else {
        return ctx.missing("Actions.SendEmail.From");
    };

    Ok(Some(SendEmailAction {
        server,
        subject,
        to,
        cc: ctx.string(map.get("Cc"), "Actions.SendEmail.Cc")?,
        bcc: ctx.string(map.get("Bcc"), "Actions.SendEmail.Bcc")?,
        reply_to: ctx.string(map.get("ReplyTo"), "Actions.SendEmail.ReplyTo")?,
        from,
        header_fields: decode_header_fields(ctx, map.get("HeaderFields"))?,
        body: ctx.string(map.get("Body"), "Actions.SendEmail.Body")?,
        attachments: decode_attachments(ctx, map.get("Attachments"))?,
    }))
}

fn decode_header_fields(
    ctx: &DecodeContext,
    node: Option<&Value>,
) -> Result<Option<HeaderFields>, TaskError> {
    let field = "Actions.SendEmail.HeaderFields";
    let Some(map) = ctx.object(node, field)? else {
        return Ok(None);
    };

    let mut fields = Vec::new();
    for entry in values::to_array(map.get("HeaderField")) {
        let Some(entry) = ctx.object(Some(entry), &format!("{field}.HeaderField"))? else {
            continue;
        };
        let Some(name) = ctx.string(entry.get("Name"), &format!("{field}.HeaderField.Name"))?
        else {
            ctx.missing::<HeaderField>(&format!("{field}.HeaderField.Name"))?;
            continue;
        };
        let Some(value) = ctx.string(entry.get("Value"), &format!("{field}.HeaderField.Value"))?
        else {
            ctx.missing::<HeaderField>(&format!("{field}.HeaderField.Value"))?;
            continue;
        };
        fields.push(HeaderField { name, value });
    }
    Ok(OneOrMany::from_vec(fields).map(|header_field| HeaderFields { header_field }))
}

fn decode_attachments(
    ctx: &DecodeContext,
    node: Option<&Value>,
) -> Result<Option<Attachments>, TaskError> {
    let field = "Actions.SendEmail.Attachments";
    let Some(map) = ctx.object(node, field)? else {
        return Ok(None);
    };
    Ok(ctx
        .string_one_or_many(map.get("File"), &format!("{field}.File"))?
        .map(|file| Attachments { file }))
}

pub(crate) fn write_actions(writer: &mut Writer<Vec<u8>>, actions: &Actions) -> io::Result<()> {
    let mut element = writer.create_element("Actions");
    if let Some(context) = actions.context.as_deref() {
        element = element.with_attribute(("Context", context));
    }
    if actions.is_empty() {
        element.write_empty()?;
        return Ok(());
    }
    element.write_inner_content(|writer| {
        for exec in &actions.exec {
            write_exec(writer, exec)?;
        }
        for com_handler in &actions.com_handler {
            write_com_handler(writer, com_handler)?;
        }
        for send_email in &actions.send_email {
            write_send_email(writer, send_email)?;
        }
        Ok(())
    })?;
    Ok(())
}

fn write_exec(writer: &mut Writer<Vec<u8>>, exec: &ExecAction) -> io::Result<()> {
    let mut element = writer.create_element("Exec");
    if let Some(id) = exec.id.as_deref() {
        element = element.with_attribute(("id", id));
    }
    element.write_inner_content(|writer| {
        write_text(writer, "Command", &exec.command)?;
        write_opt_one_or_many(writer, "Arguments", exec.arguments.as_ref())?;
        write_opt_one_or_many(writer, "WorkingDirectory", exec.working_directory.as_ref())
    })?;
    Ok(())
}

fn write_com_handler(
    writer: &mut Writer<Vec<u8>>,
    com_handler: &ComHandlerAction,
) -> io::Result<()> {
    writer
        .create_element("ComHandler")
        .write_inner_content(|writer| {
            write_text(writer, "ClassId", &com_handler.class_id)?;
            if let Some(data) = &com_handler.data {
                write_value(writer, "Data", data)?;
            }
            Ok(())
        })?;
    Ok(())
}

fn write_send_email(
    writer: &mut Writer<Vec<u8>>,
    send_email: &SendEmailAction,
) -> io::Result<()> {
    writer
        .create_element("SendEmail")
        .write_inner_content(|writer| {
            write_text(writer, "Server", &send_email.server)?;
            write_text(writer, "Subject", &send_email.subject)?;
            write_text(writer, "To", &send_email.to)?;
            write_opt_text(writer, "Cc", send_email.cc.as_deref())?;
            write_opt_text(writer, "Bcc", send_email.bcc.as_deref())?;
            write_opt_text(writer, "ReplyTo", send_email.reply_to.as_deref())?;
            write_text(writer, "From", &send_email.from)?;
            if let Some(header_fields) = &send_email.header_fields {
                writer
                    .create_element("HeaderFields")
                    .write_inner_content(|writer| {
                        for header in header_fields.header_field.iter() {
                            writer
                                .create_element("HeaderField")
                                .write_inner_content(|writer| {
                                    write_text(writer, "Name", &header.name)?;
                                    write_text(writer, "Value", &header.value)
                                })?;
                        }
                        Ok(())
                    })?;
            }
            write_opt_text(writer, "Body", send_email.body.as_deref())?;
            if let Some(attachments) = &send_email.attachments {
                writer
                    .create_element("Attachments")
                    .write_inner_content(|writer| {
                        write_opt_one_or_many(writer, "File", Some(&attachments.file))
                    })?;
            }
            Ok(())
        })?;
    Ok(())
}
