// Object ids defined for the basic and regular identification categories
const OBJECT_VENDOR_NAME: u8 = 0x00;
const OBJECT_PRODUCT_CODE: u8 = 0x01;
const OBJECT_MAJOR_MINOR_REVISION: u8 = 0x02;
const OBJECT_VENDOR_URL: u8 = 0x03;
const OBJECT_PRODUCT_NAME: u8 = 0x04;
const OBJECT_MODEL_NUMBER: u8 = 0x05;
const OBJECT_USER_APPLICATION_NAME: u8 = 0x06;

/// Identification record returned by Read Device Identification
/// (0x2B / MEI 0x0E). The first three objects are mandatory for every
/// conformity level; the rest are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceIdentification {
    pub vendor_name: String,
    pub product_code: String,
    pub major_minor_revision: String,
    pub vendor_url: Option<String>,
    pub product_name: Option<String>,
    pub model_number: Option<String>,
    pub user_application_name: Option<String>,
}

/// Walks the object list `[count, (id, length, bytes)...]` and assigns each
/// string by its object id. Ids outside the known range are skipped rather
/// than rejected; devices may append vendor-specific objects.
pub(crate) fn parse_device_identification(raw: &[u8]) -> DeviceIdentification {
    let mut identification = DeviceIdentification::default();
    let Some(&count) = raw.first() else {
        return identification;
    };

    let mut offset = 1;
    for _ in 0..count {
        let (Some(&object_id), Some(&length)) = (raw.get(offset), raw.get(offset + 1)) else {
            break;
        };
        let start = offset + 2;
        let Some(bytes) = raw.get(start..start + length as usize) else {
            break;
        };
        offset = start + length as usize;

        let value = String::from_utf8_lossy(bytes).into_owned();
        match object_id {
            OBJECT_VENDOR_NAME => identification.vendor_name = value,
            OBJECT_PRODUCT_CODE => identification.product_code = value,
            OBJECT_MAJOR_MINOR_REVISION => identification.major_minor_revision = value,
            OBJECT_VENDOR_URL => identification.vendor_url = Some(value),
            OBJECT_PRODUCT_NAME => identification.product_name = Some(value),
            OBJECT_MODEL_NUMBER => identification.model_number = Some(value),
            OBJECT_USER_APPLICATION_NAME => identification.user_application_name = Some(value),
            _ => {}
        }
    }
    identification
}
