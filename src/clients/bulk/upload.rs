//! Multipart form assembly and upload-response parsing for staged uploads.
//!
//! The staged upload target is a cloud object-storage pre-signed URL. It
//! expects a `multipart/form-data` POST carrying the signed parameters as
//! fields, in the order negotiated, followed by the file itself, and it
//! answers in XML (`PostResponse/Key`), not JSON.

use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::multipart::{Form, Part};
use reqwest::Body;

use crate::clients::bulk::errors::UploadError;
use crate::clients::bulk::types::StagedUploadParameter;

/// MIME type declared for JSONL payloads.
pub(crate) const JSONL_MIME: &str = "text/jsonl";

/// Builds the multipart form for a staged upload.
///
/// Every negotiated parameter becomes a text field, in the order given;
/// the file part is named `file` and attached last. The storage target
/// rejects forms whose file field precedes the signature fields.
pub(crate) fn build_upload_form(
    parameters: &[StagedUploadParameter],
    payload: Body,
    filename: &str,
) -> Result<Form, UploadError> {
    let mut form = Form::new();
    for parameter in parameters {
        form = form.text(parameter.name.clone(), parameter.value.clone());
    }

    let file = Part::stream(payload)
        .file_name(filename.to_string())
        .mime_str(JSONL_MIME)
        .map_err(UploadError::Network)?;

    Ok(form.part("file", file))
}

/// Extracts the storage object key from the upload response body.
///
/// The body is an XML document of the shape
/// `<PostResponse><Key>path/to/object</Key>...</PostResponse>`; the key is
/// used verbatim as the `stagedUploadPath` of the follow-up mutation.
/// Returns `Ok(None)` when the document has no `Key` element.
pub(crate) fn extract_storage_key(xml: &str) -> Result<Option<String>, UploadError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut in_key = false;
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"Key" => in_key = true,
            Event::End(e) if e.name().as_ref() == b"Key" => in_key = false,
            Event::Text(t) if in_key => {
                return Ok(Some(t.unescape()?.into_owned()));
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}
