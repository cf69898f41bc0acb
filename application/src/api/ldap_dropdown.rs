//! `LdapDropdown` endpoint definitions.

use axum::{extract::rejection::FormRejection, Extension, Form, Json};
use serde::Deserialize;
use service::{
    domain::question,
    infra::Directory,
    query::ldap_dropdown,
    read::dropdown::list::{Arguments, Page},
    Query as _,
};

use crate::{define_error, AsError, Error};

use super::SPAN_NAME;

/// Form-encoded parameters of the `LdapDropdown` endpoint.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Params {
    /// Reference to the question the dropdown belongs to.
    pub condition: Option<String>,

    /// Text the returned values should contain.
    #[serde(rename = "searchText")]
    pub search_text: Option<String>,

    /// 1-based index of the requested page.
    pub page: Option<String>,

    /// Maximum number of values on the requested page.
    pub page_limit: Option<String>,
}

define_error! {
    enum ParamsError {
        #[code = "UNKNOWN_CONDITION"]
        #[status = BAD_REQUEST]
        #[message = "`condition` must reference an LDAP question"]
        Condition,

        #[code = "INVALID_PAGINATION"]
        #[status = BAD_REQUEST]
        #[message = "`page` and `page_limit` must be positive integers"]
        Pagination,
    }
}

/// Returns a page of distinct directory values answering an LDAP question.
///
/// # Errors
///
/// Possible error statuses:
/// - `400 Bad Request` - parameters are missing or invalid, or the question
///   configuration cannot be resolved;
/// - `403 Forbidden` - the form of the question is inactive;
/// - `500 Internal Server Error` - the directory server is unavailable.
#[tracing::instrument(
    skip_all,
    fields(
        http.handler = "LdapDropdown",
        otel.name = SPAN_NAME,
    ),
)]
pub async fn handle<Dir>(
    Extension(service): Extension<service::Service<Dir>>,
    form: Result<Form<Params>, FormRejection>,
) -> Result<Json<Page>, Error>
where
    Dir: Directory + Sync,
{
    let Form(Params {
        condition,
        search_text,
        page,
        page_limit,
    }) = form.map_err(AsError::into_error)?;

    let question_id = condition
        .and_then(|c| c.trim().parse::<question::Id>().ok())
        .ok_or_else(|| Error::from(ParamsError::Condition))?;

    let number = |v: Option<String>| v.and_then(|v| v.trim().parse::<u32>().ok());
    let arguments = Arguments::new(number(page), number(page_limit))
        .ok_or_else(|| Error::from(ParamsError::Pagination))?;

    service
        .execute(ldap_dropdown::ByQuestion {
            question_id,
            search_text: search_text.unwrap_or_default(),
            arguments,
        })
        .await
        .map(Json)
        .map_err(AsError::into_error)
}

impl AsError for ldap_dropdown::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "QUESTION_NOT_EXISTS"]
                #[status = BAD_REQUEST]
                #[message = "LDAP question doesn't exist"]
                QuestionNotExists,

                #[code = "CONFIGURATION_UNRESOLVED"]
                #[status = BAD_REQUEST]
                #[message = "LDAP question references an unknown server or \
                             attribute"]
                ConfigurationUnresolved,

                #[code = "FORM_INACTIVE"]
                #[status = FORBIDDEN]
                #[message = "Form of the LDAP question is inactive"]
                FormInactive,
            }
        }

        match self {
            Self::DirectoryUnavailable(e) => e.try_as_error(),
            Self::QuestionNotExists(_) => Some(Error::QuestionNotExists.into()),
            Self::ServerNotExists(_) | Self::AttributeNotExists(_) => {
                Some(Error::ConfigurationUnresolved.into())
            }
            Self::FormInactive(_) => Some(Error::FormInactive.into()),
        }
    }
}

#[cfg(test)]
mod spec {
    use axum::body::Body;
    use http::{header, Method, Request, StatusCode};
    use serde_json::json;

    use super::super::spec::{app, body, send, users};

    fn request(form: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/LdapDropdown")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_owned()))
            .unwrap()
    }

    #[tokio::test]
    async fn responds_with_page() {
        let dir = users(["brazil1", "brazil0", "ecuador248"]);

        let res = send(
            app(dir.clone(), true),
            request("condition=10&searchText=brazil&page=1&page_limit=1"),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let page: serde_json::Value =
            serde_json::from_slice(&body(res).await).unwrap();
        assert_eq!(
            page,
            json!({
                "results": [{ "id": "brazil1", "text": "brazil1" }],
                "count": 1,
            }),
        );

        let res = send(
            app(dir, true),
            request("condition=10&searchText=ecuador248&page=1&page_limit=20"),
        )
        .await;
        let page: serde_json::Value =
            serde_json::from_slice(&body(res).await).unwrap();
        assert_eq!(
            page,
            json!({
                "results": [{ "id": "ecuador248", "text": "ecuador248" }],
                "count": 1,
            }),
        );
    }

    #[tokio::test]
    async fn search_text_is_optional() {
        let dir = users(["remi", "michel", "pierre"]);

        let res =
            send(app(dir, true), request("condition=10&page=1&page_limit=5"))
                .await;
        assert_eq!(res.status(), StatusCode::OK);
        let page: serde_json::Value =
            serde_json::from_slice(&body(res).await).unwrap();
        assert_eq!(page["count"], 3);
        assert_eq!(page["results"][0]["text"], "michel");
    }

    #[tokio::test]
    async fn rejects_invalid_params_with_empty_body() {
        for form in [
            "condition=10&page=0&page_limit=5",
            "condition=10&page=1&page_limit=0",
            "condition=10&page_limit=5",
            "condition=10&page=1",
            "condition=10&page=first&page_limit=5",
            "page=1&page_limit=5",
            "condition=unknown&page=1&page_limit=5",
            "condition=99&page=1&page_limit=5",
        ] {
            let res = send(app(users(["remi"]), true), request(form)).await;

            assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{form}");
            assert!(body(res).await.is_empty(), "{form}");
        }
    }

    #[tokio::test]
    async fn rejects_inactive_form() {
        let res = send(
            app(users(["remi"]), false),
            request("condition=10&page=1&page_limit=5"),
        )
        .await;

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert!(body(res).await.is_empty());
    }

    #[tokio::test]
    async fn fails_on_unavailable_directory() {
        let res = send(
            app(users(["remi"]).unreachable(), true),
            request("condition=10&page=1&page_limit=5"),
        )
        .await;

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body(res).await.is_empty());
    }
}
