use serde::Deserialize;
use serde_json::{Value, json};

/// 工具协议版本号
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON 解析失败
pub const PARSE_ERROR: i64 = -32700;
/// 请求结构非法 (非对象、版本不符、缺 method)
pub const INVALID_REQUEST: i64 = -32600;
/// 方法执行内部错误
pub const INTERNAL_ERROR: i64 = -32603;

/// # Summary
/// 入站 JSON-RPC 请求的宽松映射。
/// 字段全部可缺，结构校验在分发层逐项进行，以便给出精确的错误码。
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: Option<String>,
    pub method: Option<String>,
    #[serde(default)]
    pub params: Value,
    pub id: Option<Value>,
}

/// 构造成功响应。请求未携带 id 时响应同样省略 id。
pub fn result_response(id: Option<&Value>, result: Value) -> Value {
    let mut resp = json!({"jsonrpc": "2.0", "result": result});
    if let (Some(obj), Some(id)) = (resp.as_object_mut(), id) {
        obj.insert("id".into(), id.clone());
    }
    resp
}

/// 构造错误响应
pub fn error_response(id: Option<&Value>, code: i64, message: impl Into<String>) -> Value {
    let mut resp = json!({
        "jsonrpc": "2.0",
        "error": {"code": code, "message": message.into()}
    });
    if let (Some(obj), Some(id)) = (resp.as_object_mut(), id) {
        obj.insert("id".into(), id.clone());
    }
    resp
}

/// 工具调用结果: 文本内容块
pub fn text_content(text: impl Into<String>) -> Value {
    json!({"content": [{"type": "text", "text": text.into()}]})
}

/// 工具调用结果: 文本内容块 + isError 标记
pub fn error_content(text: impl Into<String>) -> Value {
    json!({
        "content": [{"type": "text", "text": text.into()}],
        "isError": true
    })
}
