use http::Request;
use storauth_azure_storage::{
    Credential, RequestSigner, SigningScheme, StaticCredentialProvider,
};
use storauth_core::time::parse_rfc3339;
use storauth_core::{Context, ErrorKind, Signer};
use test_case::test_case;

use crate::{init, DEV_ACCOUNT_KEY};

fn signer(scheme: SigningScheme) -> Signer<Credential> {
    init();

    let loader = StaticCredentialProvider::new_shared_key("myaccount", DEV_ACCOUNT_KEY)
        .expect("dev key must be valid");
    let builder = RequestSigner::new()
        .with_scheme(scheme)
        .with_time(parse_rfc3339("2022-03-01T08:12:34Z").expect("time must be valid"));
    Signer::new(Context::new(), loader, builder)
}

fn parts(req: http::request::Builder) -> http::request::Parts {
    req.body(()).unwrap().into_parts().0
}

#[test_case(
    SigningScheme::SharedKey,
    Request::put("https://myaccount.blob.core.windows.net/mycontainer/myblob?comp=block&blockid=YQ%3D%3D")
        .header("x-ms-version", "2018-11-09")
        .header("content-length", "0")
    => "SharedKey myaccount:fokoAzYbK4tc1s5wAF438q0DRGghdXs1oeYWJFpjdJ8=";
    "put block"
)]
#[test_case(
    SigningScheme::SharedKeyTable,
    Request::get("https://myaccount.table.core.windows.net/mytable()?comp=acl")
    => "SharedKey myaccount:oRtjktRll2u7zbMVkvxqVmIWLl/+59OYc3N7eTmmug4=";
    "table acl"
)]
#[test_case(
    SigningScheme::SharedKeyLite,
    Request::get("https://myaccount.blob.core.windows.net/c?restype=container&comp=list")
    => "SharedKeyLite myaccount:tT/x0LCxZ/qFbYqZCzP+QT29B9Iyc6X7/9fc/3+mEnk=";
    "lite list blobs"
)]
fn test_authorization(scheme: SigningScheme, req: http::request::Builder) -> String {
    let mut req = parts(req);
    signer(scheme).sign(&mut req, None).unwrap();

    assert_eq!(req.headers["x-ms-date"], "Tue, 01 Mar 2022 08:12:34 GMT");
    req.headers["authorization"].to_str().unwrap().to_string()
}

#[test]
fn test_query_is_reencoded() {
    let mut req = parts(
        Request::put("https://myaccount.blob.core.windows.net/mycontainer/myblob?comp=block&blockid=YQ%3D%3D")
            .header("x-ms-version", "2018-11-09"),
    );
    signer(SigningScheme::SharedKey).sign(&mut req, None).unwrap();

    assert_eq!(
        req.uri,
        "https://myaccount.blob.core.windows.net/mycontainer/myblob?comp=block&blockid=YQ%3D%3D"
    );
}

#[test]
fn test_rotation_changes_signature_for_every_clone() {
    let signer = signer(SigningScheme::SharedKey);
    let other = signer.clone();

    let sign = |s: &Signer<Credential>| {
        let mut req = parts(Request::get("https://myaccount.blob.core.windows.net/c"));
        s.sign(&mut req, None).unwrap();
        req.headers["authorization"].to_str().unwrap().to_string()
    };

    let before = sign(&other);
    signer
        .rotate(Credential::with_shared_key("myaccount", "a2V5").unwrap())
        .unwrap();
    let after = sign(&other);

    assert_ne!(before, after);
    assert_eq!(after, sign(&signer));
}

#[test]
fn test_malformed_key() {
    let err = StaticCredentialProvider::new_shared_key("myaccount", "Buggy").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedKey);
}
