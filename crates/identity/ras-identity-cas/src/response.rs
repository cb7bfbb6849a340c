//! CAS service response codec.
//!
//! Elements are matched by namespace URI and local name, so the prefix the
//! server happens to declare is irrelevant.

use crate::error::{CasError, CasResult};
use roxmltree::{Document, Node};
use std::collections::BTreeMap;

pub const CAS_NAMESPACE: &str = "http://www.yale.edu/tp/cas";

/// Body of a `serviceValidate` response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceResponse {
    Success(AuthenticationSuccess),
    Failure(AuthenticationFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationSuccess {
    /// Principal name
    pub user: String,
    /// Optional CAS 3.0 attributes, keyed by element local name
    pub attributes: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationFailure {
    pub code: String,
    pub reason: String,
}

impl ServiceResponse {
    pub fn parse(body: &[u8]) -> CasResult<Self> {
        let text = std::str::from_utf8(body)
            .map_err(|e| CasError::ProtocolError(format!("response is not UTF-8: {}", e)))?;
        let document = Document::parse(text)
            .map_err(|e| CasError::ProtocolError(format!("malformed XML: {}", e)))?;

        let root = document.root_element();
        if !is_cas_element(root, "serviceResponse") {
            return Err(CasError::ProtocolError(format!(
                "unexpected root element <{}>",
                root.tag_name().name()
            )));
        }

        match (
            cas_child(root, "authenticationSuccess"),
            cas_child(root, "authenticationFailure"),
        ) {
            (Some(success), None) => parse_success(success).map(ServiceResponse::Success),
            (None, Some(failure)) => parse_failure(failure).map(ServiceResponse::Failure),
            (Some(_), Some(_)) => Err(CasError::ProtocolError(
                "response carries both success and failure".to_string(),
            )),
            (None, None) => Err(CasError::ProtocolError(
                "response carries neither success nor failure".to_string(),
            )),
        }
    }
}

fn parse_success(node: Node<'_, '_>) -> CasResult<AuthenticationSuccess> {
    let user = cas_child(node, "user")
        .map(text_content)
        .filter(|user| !user.is_empty())
        .ok_or_else(|| {
            CasError::ProtocolError("authentication success without a user".to_string())
        })?;

    let mut attributes: BTreeMap<String, Vec<String>> = BTreeMap::new();
    if let Some(attrs) = cas_child(node, "attributes") {
        for attr in attrs.children().filter(|n| n.is_element()) {
            attributes
                .entry(attr.tag_name().name().to_string())
                .or_default()
                .push(text_content(attr));
        }
    }

    Ok(AuthenticationSuccess { user, attributes })
}

fn parse_failure(node: Node<'_, '_>) -> CasResult<AuthenticationFailure> {
    let code = node
        .attribute("code")
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .ok_or_else(|| {
            CasError::ProtocolError("authentication failure without a code".to_string())
        })?;

    Ok(AuthenticationFailure {
        code: code.to_string(),
        reason: text_content(node),
    })
}

fn is_cas_element(node: Node<'_, '_>, name: &str) -> bool {
    node.is_element()
        && node.tag_name().namespace() == Some(CAS_NAMESPACE)
        && node.tag_name().name() == name
}

fn cas_child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| is_cas_element(*child, name))
}

fn text_content(node: Node<'_, '_>) -> String {
    let text: String = node
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    text.trim().to_string()
}
