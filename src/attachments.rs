//! Chat attachments
//!
//! Files arrive base64-encoded alongside the chat transcript. Images are
//! forwarded to the model as `image_url` parts; plain text is inlined; other
//! documents are only announced by name.

use crate::openai::{ChatMessage, ContentPart, ImageUrl, MessageContent};
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Standard alphabet, accepting input with or without `=` padding
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingFile {
    pub name: String,
    #[serde(rename = "type", default)]
    pub mime_type: String,
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProcessedFile {
    Image {
        name: String,
        mime_type: String,
        data: String,
    },
    Text {
        name: String,
        content: String,
    },
    Document {
        name: String,
        kind: &'static str,
    },
    Unknown {
        name: String,
    },
}

impl ProcessedFile {
    fn is_image(&self) -> bool {
        matches!(self, ProcessedFile::Image { .. })
    }
}

fn ends_with_any(name: &str, suffixes: &[&str]) -> bool {
    suffixes.iter().any(|s| name.ends_with(s))
}

/// Classify a single file. `None` when a text file cannot be decoded.
pub fn process_file(file: &IncomingFile) -> Option<ProcessedFile> {
    let name = file.name.to_lowercase();
    let mime = file.mime_type.as_str();

    let processed = if mime.starts_with("image/") {
        ProcessedFile::Image {
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            data: file.data.clone(),
        }
    } else if mime == "text/plain" || name.ends_with(".txt") {
        match LENIENT_BASE64.decode(file.data.trim()) {
            Ok(bytes) => ProcessedFile::Text {
                name: file.name.clone(),
                content: String::from_utf8_lossy(&bytes).into_owned(),
            },
            Err(e) => {
                warn!("Dropping text attachment {}: {}", file.name, e);
                return None;
            }
        }
    } else if mime == "application/pdf" || name.ends_with(".pdf") {
        ProcessedFile::Document {
            name: file.name.clone(),
            kind: "PDF",
        }
    } else if mime.contains("word") || ends_with_any(&name, &[".docx", ".doc"]) {
        ProcessedFile::Document {
            name: file.name.clone(),
            kind: "Word",
        }
    } else if mime.contains("sheet") || ends_with_any(&name, &[".xlsx", ".xls", ".csv"]) {
        ProcessedFile::Document {
            name: file.name.clone(),
            kind: "Planilha",
        }
    } else {
        ProcessedFile::Unknown {
            name: file.name.clone(),
        }
    };

    Some(processed)
}

pub fn process_files(files: &[IncomingFile]) -> Vec<ProcessedFile> {
    let processed: Vec<ProcessedFile> = files.iter().filter_map(process_file).collect();
    if !processed.is_empty() {
        info!("Processed {} of {} attachments", processed.len(), files.len());
    }
    processed
}

/// Context block describing non-image attachments
fn files_context<'a>(files: impl Iterator<Item = &'a ProcessedFile>) -> String {
    let mut context = String::from("\n\n📎 Arquivos anexados:\n");
    for file in files {
        match file {
            ProcessedFile::Text { name, content } => {
                context.push_str(&format!("- 📄 {}:\n```\n{}\n```\n", name, content));
            }
            ProcessedFile::Document { name, kind } => {
                context.push_str(&format!(
                    "- 📋 {} ({}) - Documento identificado mas conteúdo não extraído ainda.\n",
                    name, kind
                ));
            }
            ProcessedFile::Unknown { name } | ProcessedFile::Image { name, .. } => {
                context.push_str(&format!("- 📎 {}\n", name));
            }
        }
    }
    context
}

/// Attach processed files to the last message of the transcript
pub fn attach_files(mut messages: Vec<ChatMessage>, files: &[ProcessedFile]) -> Vec<ChatMessage> {
    if files.is_empty() || messages.is_empty() {
        return messages;
    }

    let has_images = files.iter().any(ProcessedFile::is_image);
    let mut others = files.iter().filter(|f| !f.is_image()).peekable();
    let context = if others.peek().is_some() {
        Some(files_context(others))
    } else {
        None
    };

    let last_index = messages.len() - 1;
    let last = &mut messages[last_index];

    if has_images {
        let mut parts = Vec::new();

        match &last.content {
            MessageContent::Text(text) => {
                let mut text = text.clone();
                if let Some(context) = &context {
                    text.push_str(context);
                }
                parts.push(ContentPart::Text { text });
            }
            MessageContent::Parts(existing) => parts.extend(existing.iter().cloned()),
        }

        for file in files {
            if let ProcessedFile::Image {
                mime_type, data, ..
            } = file
            {
                parts.push(ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: format!("data:{};base64,{}", mime_type, data),
                    },
                });
            }
        }

        last.content = MessageContent::Parts(parts);
    } else if let (MessageContent::Text(text), Some(context)) = (&mut last.content, context) {
        text.push_str(&context);
    }

    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::Role;

    fn file(name: &str, mime: &str, data: &str) -> IncomingFile {
        IncomingFile {
            name: name.to_string(),
            mime_type: mime.to_string(),
            data: data.to_string(),
        }
    }

    #[test]
    fn test_classification() {
        let cases = vec![
            (file("foto.png", "image/png", "AAAA"), "image"),
            (file("notas.txt", "", "b2k="), "text"),
            (file("contrato.pdf", "application/octet-stream", ""), "PDF"),
            (
                file("memo", "application/vnd.openxmlformats-officedocument.wordprocessingml.document", ""),
                "Word",
            ),
            (file("dados.csv", "", ""), "Planilha"),
            (file("RELATORIO.XLSX", "", ""), "Planilha"),
            (file("archive.zip", "application/zip", ""), "unknown"),
        ];

        for (input, expected) in cases {
            let kind = match process_file(&input).unwrap() {
                ProcessedFile::Image { .. } => "image",
                ProcessedFile::Text { .. } => "text",
                ProcessedFile::Document { kind, .. } => kind,
                ProcessedFile::Unknown { .. } => "unknown",
            };
            assert_eq!(kind, expected, "file: {}", input.name);
        }
    }

    #[test]
    fn test_text_is_decoded() {
        let processed = process_file(&file("a.txt", "text/plain", "b2zDoQ==")).unwrap();
        assert_eq!(
            processed,
            ProcessedFile::Text {
                name: "a.txt".to_string(),
                content: "olá".to_string(),
            }
        );
    }

    #[test]
    fn test_unpadded_text_is_decoded() {
        let processed = process_file(&file("a.txt", "text/plain", "b2k")).unwrap();
        assert_eq!(
            processed,
            ProcessedFile::Text {
                name: "a.txt".to_string(),
                content: "oi".to_string(),
            }
        );
    }

    #[test]
    fn test_undecodable_text_is_dropped() {
        let files = vec![file("a.txt", "text/plain", "%%%"), file("b.pdf", "", "")];
        let processed = process_files(&files);
        assert_eq!(processed.len(), 1);
    }

    #[test]
    fn test_no_files_leaves_messages_untouched() {
        let messages = vec![ChatMessage::user("oi")];
        assert_eq!(attach_files(messages.clone(), &[]), messages);
    }

    #[test]
    fn test_documents_are_appended_as_text() {
        let files = process_files(&[file("a.txt", "text/plain", "b2k="), file("b.pdf", "", "")]);
        let out = attach_files(vec![ChatMessage::user("resuma")], &files);

        let MessageContent::Text(text) = &out[0].content else {
            panic!("expected text content");
        };
        assert!(text.starts_with("resuma\n\n📎 Arquivos anexados:\n"));
        assert!(text.contains("- 📄 a.txt:\n```\noi\n```\n"));
        assert!(text.contains("- 📋 b.pdf (PDF)"));
    }

    #[test]
    fn test_images_become_parts_on_last_message() {
        let files = process_files(&[file("foto.jpg", "image/jpeg", "QUJD"), file("b.pdf", "", "")]);
        let messages = vec![ChatMessage::system("sys"), ChatMessage::user("o que é isso?")];
        let out = attach_files(messages, &files);

        assert_eq!(out[0].content, MessageContent::Text("sys".to_string()));
        assert_eq!(out[1].role, Role::User);

        let MessageContent::Parts(parts) = &out[1].content else {
            panic!("expected parts");
        };
        assert_eq!(parts.len(), 2);
        match &parts[0] {
            ContentPart::Text { text } => {
                assert!(text.starts_with("o que é isso?"));
                assert!(text.contains("b.pdf"));
            }
            other => panic!("unexpected part {:?}", other),
        }
        assert_eq!(
            parts[1],
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: "data:image/jpeg;base64,QUJD".to_string(),
                },
            }
        );
    }

    #[test]
    fn test_empty_transcript() {
        let files = process_files(&[file("b.pdf", "", "")]);
        assert!(attach_files(vec![], &files).is_empty());
    }
}
