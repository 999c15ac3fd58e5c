use axum::Router;
use axum::extract::Path;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use kabu_core::broker::error::BrokerError;
use kabu_core::broker::port::BrokerClient;
use kabu_core::trade::entity::{
    Exchange, OrderKind, OrderRequest, OrderSide, Validity, Variety,
};
use kabu_broker::kite::KiteClient;
use serde_json::json;

/// 安装 rustls 加密提供者 (整进程一次)；`rustls-no-provider` 特性要求
/// 在构建任何 reqwest 客户端 (KiteClient::new) 前完成此步。
fn ensure_crypto_provider() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// 启动本地假券商，返回其根地址
async fn serve(router: Router) -> String {
    ensure_crypto_provider();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn order_params() -> kabu_core::broker::entity::OrderParams {
    let req = OrderRequest::market("RELIANCE", 10, OrderSide::Buy);
    kabu_core::broker::entity::OrderParams {
        exchange: req.exchange,
        tradingsymbol: req.symbol,
        transaction_type: req.side,
        quantity: req.quantity,
        product: req.product,
        order_type: req.order_kind,
        validity: req.validity,
        price: None,
        trigger_price: None,
    }
}

#[tokio::test]
async fn test_exchange_code_success() {
    let router = Router::new().route(
        "/session/token",
        post(|body: String| async move {
            // 表单必须携带 api_key 与校验和
            assert!(body.contains("api_key=key"));
            assert!(body.contains("request_token=reqtok"));
            assert!(body.contains("checksum="));
            axum::Json(json!({
                "status": "success",
                "data": {
                    "access_token": "tok_xyz",
                    "user_id": "AB1234",
                    "user_name": "Test User"
                }
            }))
        }),
    );
    let base = serve(router).await;

    let client = KiteClient::new("key", "secret").with_api_base(base);
    let session = client.exchange_code("reqtok").await.unwrap();
    assert_eq!(session.access_token, "tok_xyz");
    assert_eq!(session.user_id, "AB1234");
    assert_eq!(session.user_name.as_deref(), Some("Test User"));
}

#[tokio::test]
async fn test_exchange_code_rejection_is_input_error() {
    let router = Router::new().route(
        "/session/token",
        post(|| async {
            (
                axum::http::StatusCode::FORBIDDEN,
                axum::Json(json!({
                    "status": "error",
                    "message": "Token is invalid or has expired.",
                    "error_type": "TokenException"
                })),
            )
        }),
    );
    let base = serve(router).await;

    let client = KiteClient::new("key", "secret").with_api_base(base);
    let err = client.exchange_code("used_token").await.unwrap_err();
    // 换码阶段的凭据拒绝属于输入错误，不应触发会话失效路径
    assert!(matches!(err, BrokerError::Input(_)), "错误归类不符: {:?}", err);
    assert!(err.raw_message().contains("invalid or has expired"));
}

#[tokio::test]
async fn test_profile_probe_maps_token_exception_to_auth() {
    let router = Router::new().route(
        "/user/profile",
        get(|headers: HeaderMap| async move {
            let auth = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            if auth == "token key:valid_tok" {
                axum::Json(json!({
                    "status": "success",
                    "data": {"user_id": "AB1234", "user_name": "Test User"}
                }))
                .into_response()
            } else {
                (
                    axum::http::StatusCode::FORBIDDEN,
                    axum::Json(json!({
                        "status": "error",
                        "message": "Incorrect `api_key` or `access_token`.",
                        "error_type": "TokenException"
                    })),
                )
                    .into_response()
            }
        }),
    );
    let base = serve(router).await;
    let client = KiteClient::new("key", "secret").with_api_base(base);

    let profile = client.profile("valid_tok").await.unwrap();
    assert_eq!(profile.user_name, "Test User");

    let err = client.profile("stale_tok").await.unwrap_err();
    assert!(err.is_auth());
}

#[tokio::test]
async fn test_submit_order_returns_order_id() {
    let router = Router::new().route(
        "/orders/{variety}",
        post(|Path(variety): Path<String>, body: String| async move {
            assert_eq!(variety, "regular");
            assert!(body.contains("tradingsymbol=RELIANCE"));
            assert!(body.contains("transaction_type=BUY"));
            assert!(body.contains("quantity=10"));
            // 市价单不得携带价格字段
            assert!(!body.contains("price="));
            axum::Json(json!({"status": "success", "data": {"order_id": "171000001"}}))
        }),
    );
    let base = serve(router).await;
    let client = KiteClient::new("key", "secret").with_api_base(base);

    let order_id = client
        .submit_order("tok", Variety::Regular, &order_params())
        .await
        .unwrap();
    assert_eq!(order_id, "171000001");
}

#[tokio::test]
async fn test_submit_order_limit_carries_price() {
    let router = Router::new().route(
        "/orders/{variety}",
        post(|body: String| async move {
            assert!(body.contains("order_type=LIMIT"));
            assert!(body.contains("price=2500.5"));
            axum::Json(json!({"status": "success", "data": {"order_id": "171000002"}}))
        }),
    );
    let base = serve(router).await;
    let client = KiteClient::new("key", "secret").with_api_base(base);

    let mut params = order_params();
    params.order_type = OrderKind::Limit;
    params.price = Some(rust_decimal::Decimal::new(25005, 1));
    params.validity = Validity::Day;
    params.exchange = Exchange::Nse;

    let order_id = client
        .submit_order("tok", Variety::Regular, &params)
        .await
        .unwrap();
    assert_eq!(order_id, "171000002");
}

#[tokio::test]
async fn test_submit_order_input_rejection() {
    let router = Router::new().route(
        "/orders/{variety}",
        post(|| async {
            (
                axum::http::StatusCode::BAD_REQUEST,
                axum::Json(json!({
                    "status": "error",
                    "message": "Insufficient funds. Required margin is 25000.00",
                    "error_type": "InputException"
                })),
            )
        }),
    );
    let base = serve(router).await;
    let client = KiteClient::new("key", "secret").with_api_base(base);

    let err = client
        .submit_order("tok", Variety::Regular, &order_params())
        .await
        .unwrap_err();
    assert!(matches!(err, BrokerError::Input(_)));
    assert!(err.raw_message().contains("Insufficient funds"));
}

#[tokio::test]
async fn test_server_error_maps_to_network() {
    let router = Router::new().route(
        "/orders",
        get(|| async {
            (
                axum::http::StatusCode::BAD_GATEWAY,
                axum::Json(json!({"status": "error", "message": "Gateway timed out"})),
            )
        }),
    );
    let base = serve(router).await;
    let client = KiteClient::new("key", "secret").with_api_base(base);

    let err = client.list_orders("tok").await.unwrap_err();
    assert!(matches!(err, BrokerError::Network(_)));
}

#[tokio::test]
async fn test_net_positions_parsed_from_net_array() {
    let router = Router::new().route(
        "/portfolio/positions",
        get(|| async {
            axum::Json(json!({
                "status": "success",
                "data": {
                    "net": [
                        {"tradingsymbol": "RELIANCE", "quantity": 10, "last_price": 2501.5},
                        {"tradingsymbol": "TCS", "quantity": 0, "last_price": 3900.0}
                    ],
                    "day": []
                }
            }))
        }),
    );
    let base = serve(router).await;
    let client = KiteClient::new("key", "secret").with_api_base(base);

    let positions = client.net_positions("tok").await.unwrap();
    assert_eq!(positions.len(), 2);
    assert_eq!(positions[0].tradingsymbol, "RELIANCE");
    assert_eq!(positions[0].quantity, 10);
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // 无人监听的端口：传输层失败必须归类为 Network
    ensure_crypto_provider();
    let client = KiteClient::new("key", "secret").with_api_base("http://127.0.0.1:1");
    let err = client.profile("tok").await.unwrap_err();
    assert!(matches!(err, BrokerError::Network(_)));
}
