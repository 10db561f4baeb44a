use super::test_helpers::*;
use super::*;
use crate::error::{FetchOp, ValidationError};
use crate::session::provider::AuthError;

fn ids(store: &RecordStore) -> Vec<FilmeId> {
    store.items().into_iter().map(|f| f.id).collect()
}

// =============================================================================
// list
// =============================================================================

#[tokio::test]
async fn list_replaces_items_in_backend_order() {
    let (api, store) = test_store();
    seed(&api, &store, vec![filme(7)]).await;

    api.push_list(Ok(vec![filme(1), filme(2)]));
    let items = store.list().await.unwrap();

    assert_eq!(items, vec![filme(1), filme(2)]);
    assert_eq!(store.items(), vec![filme(1), filme(2)]);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn list_sends_bearer_credential() {
    let (api, store) = test_store();
    store.list().await.unwrap();
    assert_eq!(api.calls(), vec![ApiCall::List { credential: TOKEN.into() }]);
}

#[tokio::test]
async fn failed_list_leaves_items_untouched() {
    let (api, store) = test_store();
    seed(&api, &store, vec![filme(1), filme(2)]).await;

    api.push_list(Err(FilmesError::Fetch { op: FetchOp::Load, status: 500, body: "boom".into() }));
    let err = store.list().await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(ids(&store), vec![FilmeId::Num(1), FilmeId::Num(2)]);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn list_without_credential_is_auth_error() {
    let api = Arc::new(MockApi::default());
    let store = RecordStore::new(api.clone(), session_without_credential(AuthError::ConsentRequired));

    let err = store.list().await.unwrap_err();

    assert!(matches!(err, FilmesError::Auth(AuthError::ConsentRequired)));
    assert!(api.calls().is_empty());
    assert!(!store.is_loading());
}

// =============================================================================
// create
// =============================================================================

#[tokio::test]
async fn create_prepends_created_record() {
    let (api, store) = test_store();
    seed(&api, &store, vec![filme(1), filme(2)]).await;

    api.push_create(Ok(filme(99)));
    let created = store.create(&draft("4")).await.unwrap();

    assert_eq!(created.id, FilmeId::Num(99));
    assert_eq!(ids(&store), vec![FilmeId::Num(99), FilmeId::Num(1), FilmeId::Num(2)]);
}

#[tokio::test]
async fn create_into_empty_list() {
    let (api, store) = test_store();
    api.push_create(Ok(filme(99)));
    store.create(&draft("4")).await.unwrap();
    assert_eq!(ids(&store), vec![FilmeId::Num(99)]);
}

#[tokio::test]
async fn create_submits_rounded_nota() {
    let (api, store) = test_store();
    api.push_create(Ok(filme(99)));
    store.create(&draft("4.26")).await.unwrap();

    let calls = api.calls();
    let [ApiCall::Create { credential, payload }] = calls.as_slice() else {
        panic!("expected one create call, got {calls:?}");
    };
    assert_eq!(credential, TOKEN);
    assert_eq!(payload.nota, 4.3);
    assert_eq!(payload.nome.as_deref(), Some("Novo"));
}

#[tokio::test]
async fn invalid_nota_makes_no_request() {
    let (api, store) = test_store();
    for nota in ["-0.1", "5.1", "abc", ""] {
        let err = store.create(&draft(nota)).await.unwrap_err();
        assert!(matches!(err, FilmesError::Validation(_)), "{nota:?} -> {err}");
    }
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn out_of_range_nota_reports_value() {
    let (_api, store) = test_store();
    let err = store.create(&draft("7")).await.unwrap_err();
    assert!(matches!(err, FilmesError::Validation(ValidationError::NotaOutOfRange(v)) if v == 7.0));
}

#[tokio::test]
async fn failed_create_leaves_items_untouched() {
    let (api, store) = test_store();
    seed(&api, &store, vec![filme(1)]).await;

    api.push_create(Err(FilmesError::Fetch { op: FetchOp::Create, status: 400, body: "nome obrigatorio".into() }));
    let err = store.create(&draft("3")).await.unwrap_err();

    assert!(err.to_string().contains("nome obrigatorio"));
    assert_eq!(ids(&store), vec![FilmeId::Num(1)]);
}

// =============================================================================
// remove
// =============================================================================

#[tokio::test]
async fn remove_filters_record_and_keeps_order() {
    let (api, store) = test_store();
    seed(&api, &store, vec![filme(1), filme(2), filme(3)]).await;

    store.remove(&FilmeId::Num(2)).await.unwrap();

    assert_eq!(ids(&store), vec![FilmeId::Num(1), FilmeId::Num(3)]);
    assert!(api.calls().contains(&ApiCall::Delete { credential: TOKEN.into(), id: FilmeId::Num(2) }));
}

#[tokio::test]
async fn remove_forbidden_is_permission_error() {
    let (api, store) = test_store();
    seed(&api, &store, vec![filme(1), filme(2)]).await;

    api.push_delete(Err(FilmesError::Permission));
    let err = store.remove(&FilmeId::Num(2)).await.unwrap_err();

    assert!(matches!(err, FilmesError::Permission));
    assert_eq!(ids(&store), vec![FilmeId::Num(1), FilmeId::Num(2)]);
}

#[tokio::test]
async fn remove_server_error_is_generic_fetch_error() {
    let (api, store) = test_store();
    seed(&api, &store, vec![filme(1)]).await;

    api.push_delete(Err(FilmesError::Fetch { op: FetchOp::Delete, status: 500, body: String::new() }));
    let err = store.remove(&FilmeId::Num(1)).await.unwrap_err();

    assert!(matches!(err, FilmesError::Fetch { status: 500, .. }));
    assert_eq!(ids(&store), vec![FilmeId::Num(1)]);
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test]
async fn concurrent_operations_share_one_credential_and_all_apply() {
    let (api, store) = test_store();
    seed(&api, &store, vec![filme(1), filme(2)]).await;

    api.push_create(Ok(filme(99)));
    let new_filme = draft("2");
    let removed_id = FilmeId::Num(1);
    let (created, removed) = tokio::join!(store.create(&new_filme), store.remove(&removed_id));
    created.unwrap();
    removed.unwrap();

    assert_eq!(ids(&store), vec![FilmeId::Num(99), FilmeId::Num(2)]);
}

#[tokio::test]
async fn clear_empties_items() {
    let (api, store) = test_store();
    seed(&api, &store, vec![filme(1)]).await;
    store.clear();
    assert!(store.items().is_empty());
}
