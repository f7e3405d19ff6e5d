use pretty_assertions::assert_eq;
use storauth_azure_storage::{
    account_sas_string_to_sign, service_sas_string_to_sign, AccessPolicy, AccountSas, Permissions, Protocol, ResourceTypes,
    ResponseHeaders, SasResource, SasToken, ServiceSas, Services, TableRange,
};
use storauth_core::time::parse_rfc3339;
use storauth_core::ErrorKind;

use crate::{dev_key, init};

#[test]
fn test_account_sas() {
    init();

    let policy = AccessPolicy::new(Permissions::LIST | Permissions::READ)
        .start(parse_rfc3339("2022-03-01T00:00:00Z").unwrap())
        .expiry(parse_rfc3339("2022-03-02T00:00:00Z").unwrap())
        .protocol(Protocol::Https);
    let token = AccountSas::new("myaccount", dev_key(), policy)
        .services(Services::BLOB)
        .resource_types(ResourceTypes::OBJECT | ResourceTypes::CONTAINER)
        .token()
        .unwrap();

    assert_eq!(
        token.to_query_string(),
        "sv=2018-11-09&ss=b&srt=co&sp=rl&st=2022-03-01T00%3A00%3A00Z&se=2022-03-02T00%3A00%3A00Z&spr=https&sig=FQC79l%2Fm4MvAoJloTAkwImXcNxmcFUX7anvGuPcmQ3A%3D"
    );
}

#[test]
fn test_blob_sas() {
    init();

    let policy = AccessPolicy::new(Permissions::READ)
        .expiry(parse_rfc3339("2022-03-02T00:00:00Z").unwrap())
        .ip_range("168.1.5.60-168.1.5.70");
    let token = ServiceSas::new("myaccount", dev_key(), SasResource::blob("pics", "cat.png"), policy)
        .with_response_headers(ResponseHeaders {
            content_disposition: Some("attachment; filename=cat.png".to_string()),
            ..Default::default()
        })
        .token()
        .unwrap();

    assert_eq!(
        token.to_query_string(),
        "sv=2018-11-09&sr=b&sp=r&se=2022-03-02T00%3A00%3A00Z&sip=168.1.5.60-168.1.5.70&rscd=attachment%3B+filename%3Dcat.png&api-version=2018-11-09&sig=szK%2F1BAL49keqIew6vuRxp0y%2F2%2BjfOGjy8ZfI4MoAv4%3D"
    );
}

#[test]
fn test_account_sas_survives_parse() {
    let policy = AccessPolicy::new(Permissions::all())
        .start(parse_rfc3339("2022-03-01T00:00:00Z").unwrap())
        .expiry(parse_rfc3339("2022-03-02T00:00:00Z").unwrap())
        .ip_range("168.1.5.60-168.1.5.70")
        .protocol(Protocol::HttpsOrHttp);
    let sas = AccountSas::new("MyAccount", dev_key(), policy)
        .services(Services::QUEUE | Services::TABLE)
        .resource_types(ResourceTypes::SERVICE);

    let token = sas.token().unwrap();
    let parsed = SasToken::parse(&format!("?{token}")).unwrap();
    assert_eq!(parsed, token);

    let string_to_sign = account_sas_string_to_sign("MyAccount", &parsed);
    assert_eq!(string_to_sign, sas.string_to_sign().unwrap());
    assert_eq!(
        parsed.signature(),
        Some(dev_key().sign(&string_to_sign).as_str())
    );
}

#[test]
fn test_account_sas_ignores_flag_input_order() {
    let policy = |permissions: &str| {
        AccessPolicy::new(Permissions::parse(permissions).unwrap())
            .start(parse_rfc3339("2022-03-01T00:00:00Z").unwrap())
            .expiry(parse_rfc3339("2022-03-02T00:00:00Z").unwrap())
    };

    let forward = AccountSas::new("myaccount", dev_key(), policy("rwlp"))
        .services(Services::BLOB | Services::QUEUE | Services::FILE)
        .resource_types(ResourceTypes::SERVICE | ResourceTypes::OBJECT)
        .token()
        .unwrap();
    let backward = AccountSas::new("myaccount", dev_key(), policy("plwrrw"))
        .services(Services::parse("fqbf").unwrap())
        .resource_types(ResourceTypes::OBJECT | ResourceTypes::SERVICE)
        .token()
        .unwrap();

    assert_eq!(forward.get("ss"), Some("bqf"));
    assert_eq!(forward.get("srt"), Some("so"));
    assert_eq!(forward.get("sp"), Some("rwlp"));
    assert_eq!(forward, backward);
    assert_eq!(forward.signature(), backward.signature());
}

#[test]
fn test_every_scope_survives_parse() {
    let policy = AccessPolicy::new(Permissions::all())
        .start(parse_rfc3339("2022-03-01T00:00:00Z").unwrap())
        .expiry(parse_rfc3339("2022-03-02T00:00:00Z").unwrap())
        .protocol(Protocol::HttpsOrHttp);

    let scopes = [
        SasResource::blob("pics", "dir/cat 1.png"),
        SasResource::container("pics"),
        SasResource::queue("jobs"),
        SasResource::table("Orders"),
        SasResource::file("docs", "a/b.txt"),
        SasResource::share("docs"),
    ];

    for resource in scopes {
        let allowed = Permissions::parse(resource.permission_order()).unwrap();
        let mut sas = ServiceSas::new(
            "myaccount",
            dev_key(),
            resource.clone(),
            AccessPolicy {
                permissions: allowed,
                ..policy.clone()
            },
        );
        if matches!(resource, SasResource::Table { .. }) {
            sas = sas.with_table_range(TableRange {
                start_partition_key: Some("p 1".to_string()),
                ..Default::default()
            });
        }

        let token = sas.token().unwrap();
        let parsed = SasToken::parse(&token.to_query_string()).unwrap();
        assert_eq!(parsed, token);

        let string_to_sign = service_sas_string_to_sign("myaccount", &resource, &parsed);
        assert_eq!(string_to_sign, sas.string_to_sign().unwrap());
        assert_eq!(
            parsed.signature(),
            Some(dev_key().sign(&string_to_sign).as_str()),
            "{resource:?}"
        );
    }
}

#[test]
fn test_start_after_expiry_is_rejected() {
    let policy = AccessPolicy::new(Permissions::READ)
        .start(parse_rfc3339("2022-03-02T00:00:00Z").unwrap())
        .expiry(parse_rfc3339("2022-03-01T00:00:00Z").unwrap());

    let err = ServiceSas::new("myaccount", dev_key(), SasResource::queue("jobs"), policy.clone())
        .token()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SignatureInput);

    let err = AccountSas::new("myaccount", dev_key(), policy)
        .string_to_sign()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SignatureInput);
}
