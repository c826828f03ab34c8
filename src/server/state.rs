use crate::report::ReportClient;
use crate::services::{AddressItem, ServicesModel};

pub struct AppState {
    pub services: ServicesModel,
    pub addresses: Vec<AddressItem>,
    pub reports: ReportClient,
}
