//! Browser bindings driven by plain JavaScript objects standing in for the
//! hosted auth SDK and the application's ports.

#![cfg(target_arch = "wasm32")]

use bridge_traits::identity::codes;
use bridge_traits::IdentityProvider;
use core_auth::wasm::{JsAuthBridge, JsIdentityProvider};
use js_sys::{Array, Function, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

/// Evaluates `body` (which must `return` a value) as a function body.
fn js(body: &str) -> JsValue {
    Function::new_no_args(body).call0(&JsValue::NULL).unwrap()
}

fn get(target: &JsValue, key: &str) -> JsValue {
    Reflect::get(target, &JsValue::from_str(key)).unwrap()
}

fn get_str(target: &JsValue, key: &str) -> String {
    get(target, key).as_string().unwrap()
}

async fn sleep(ms: i32) {
    let timer = Function::new_with_args("ms", "return new Promise(r => setTimeout(r, ms));");
    let promise: Promise = timer
        .call1(&JsValue::NULL, &JsValue::from(ms))
        .unwrap()
        .unchecked_into();
    JsFuture::from(promise).await.unwrap();
}

/// Waits until `port.sent` holds at least one value.
async fn sent_values(port: &JsValue) -> Array {
    for _ in 0..100 {
        let sent: Array = get(port, "sent").unchecked_into();
        if sent.length() > 0 {
            return sent;
        }
        sleep(10).await;
    }
    panic!("no value was sent to the port");
}

fn fire(port: &JsValue) {
    Function::new_with_args("port", "port.handlers.forEach(h => h());")
        .call1(&JsValue::NULL, port)
        .unwrap();
}

fn ports() -> JsValue {
    js("return {
        signIn: { handlers: [], subscribe(fn) { this.handlers.push(fn); } },
        signOut: { handlers: [], subscribe(fn) { this.handlers.push(fn); } },
        signInInfo: { sent: [], send(v) { this.sent.push(v); } },
        signInError: { sent: [], send(v) { this.sent.push(v); } },
    };")
}

fn signed_in_provider() -> JsValue {
    js("const user = {
        uid: 'u1',
        email: 'a@b.com',
        getIdToken() { return Promise.resolve('tok123'); },
    };
    return {
        currentUser: user,
        signIn() { return Promise.resolve({ user }); },
        signOut() { return Promise.resolve(); },
    };")
}

fn cancelled_provider() -> JsValue {
    js("return {
        currentUser: null,
        signIn() {
            return Promise.reject({
                code: 'auth/popup-closed-by-user',
                message: 'Firebase: The popup has been closed by the user before ' +
                    'finalizing the operation. (auth/popup-closed-by-user).',
            });
        },
        signOut() { return Promise.resolve(); },
    };")
}

#[wasm_bindgen_test]
async fn test_rejected_sign_in_keeps_code_and_message() {
    let provider = JsIdentityProvider::new(cancelled_provider()).unwrap();

    let err = provider.sign_in_interactive().await.unwrap_err();
    assert_eq!(err.code, codes::POPUP_CLOSED_BY_USER);
    assert_eq!(
        err.message,
        "Firebase: The popup has been closed by the user before finalizing the operation. \
         (auth/popup-closed-by-user)."
    );

    let bridge = JsAuthBridge::new(cancelled_provider()).unwrap();
    let notification = bridge.sign_in().await.unwrap();
    assert_eq!(get_str(&notification, "type"), "sign-in-failed");
    let payload = get(&notification, "payload");
    assert_eq!(get_str(&payload, "code"), codes::POPUP_CLOSED_BY_USER);
    assert_eq!(get_str(&payload, "message"), err.message);
}

#[wasm_bindgen_test]
async fn test_sign_in_without_uid_is_internal_error() {
    let provider = JsIdentityProvider::new(js("return {
        signIn() { return Promise.resolve({ user: { email: 'a@b.com' } }); },
        signOut() { return Promise.resolve(); },
    };"))
    .unwrap();

    let err = provider.sign_in_interactive().await.unwrap_err();
    assert_eq!(err.code, codes::INTERNAL_ERROR);
}

#[wasm_bindgen_test]
fn test_provider_without_sign_in_is_rejected() {
    assert!(JsIdentityProvider::new(js("return { signOut() {} };")).is_err());
}

#[wasm_bindgen_test]
async fn test_wired_ports_receive_success() {
    let bridge = JsAuthBridge::new(signed_in_provider()).unwrap();
    let ports = ports();
    bridge.wire_ports(ports.clone()).unwrap();

    fire(&get(&ports, "signIn"));

    let sent = sent_values(&get(&ports, "signInInfo")).await;
    assert_eq!(sent.length(), 1);
    let info = sent.get(0);
    assert_eq!(get_str(&info, "token"), "tok123");
    assert_eq!(get_str(&info, "email"), "a@b.com");
    assert_eq!(get_str(&info, "uid"), "u1");

    let errors: Array = get(&get(&ports, "signInError"), "sent").unchecked_into();
    assert_eq!(errors.length(), 0);
}

#[wasm_bindgen_test]
async fn test_wired_ports_receive_failure() {
    let bridge = JsAuthBridge::new(cancelled_provider()).unwrap();
    let ports = ports();
    bridge.wire_ports(ports.clone()).unwrap();

    fire(&get(&ports, "signIn"));

    let sent = sent_values(&get(&ports, "signInError")).await;
    assert_eq!(sent.length(), 1);
    assert_eq!(get_str(&sent.get(0), "code"), codes::POPUP_CLOSED_BY_USER);

    let infos: Array = get(&get(&ports, "signInInfo"), "sent").unchecked_into();
    assert_eq!(infos.length(), 0);
}

#[wasm_bindgen_test]
async fn test_outcome_before_wiring_is_delivered() {
    let bridge = JsAuthBridge::new(signed_in_provider()).unwrap();
    bridge.sign_in().await.unwrap();

    let ports = ports();
    bridge.wire_ports(ports.clone()).unwrap();

    let sent = sent_values(&get(&ports, "signInInfo")).await;
    assert_eq!(get_str(&sent.get(0), "uid"), "u1");
}

#[wasm_bindgen_test]
fn test_wire_ports_rejects_port_without_send() {
    let bridge = JsAuthBridge::new(signed_in_provider()).unwrap();
    let ports = ports();
    Reflect::set(&ports, &JsValue::from_str("signInError"), &js("return {};")).unwrap();

    let err = bridge.wire_ports(ports.clone()).unwrap_err();
    assert_eq!(err.as_string().unwrap(), "ports.signInError has no `send`");

    // Nothing was subscribed before the check failed
    let handlers: Array = get(&get(&ports, "signIn"), "handlers").unchecked_into();
    assert_eq!(handlers.length(), 0);
}

#[wasm_bindgen_test]
fn test_wire_ports_rejects_port_without_subscribe() {
    let bridge = JsAuthBridge::new(signed_in_provider()).unwrap();
    let ports = ports();
    Reflect::set(&ports, &JsValue::from_str("signOut"), &js("return { send() {} };")).unwrap();

    let err = bridge.wire_ports(ports).unwrap_err();
    assert_eq!(err.as_string().unwrap(), "ports.signOut has no `subscribe`");
}
