use crate::api::{Client, User};
use crate::provider_data::WoodpeckerProviderData;
use std::sync::Arc;
use tfplug::{Dynamic, DynamicValue};

pub(crate) fn provider_data(server_url: &str) -> Arc<WoodpeckerProviderData> {
    let client = Client::new(server_url, "test-token", false).unwrap();
    let self_user = User {
        id: 1,
        login: "admin".to_string(),
        admin: true,
        active: true,
        ..Default::default()
    };
    Arc::new(WoodpeckerProviderData::new(client, self_user))
}

pub(crate) fn instance(pairs: &[(&str, Dynamic)]) -> DynamicValue {
    let mut dv = DynamicValue::object();
    for (name, value) in pairs {
        dv.set(name, value.clone());
    }
    dv
}

pub(crate) fn s(value: &str) -> Dynamic {
    Dynamic::String(value.to_string())
}

pub(crate) fn set(values: &[&str]) -> Dynamic {
    Dynamic::List(values.iter().map(|v| s(v)).collect())
}
