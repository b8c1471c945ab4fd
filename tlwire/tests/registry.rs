use tlwire::deserialize::{Error, LengthError};
use tlwire::registry::{self, ConflictError};
use tlwire::{
    BOOL_TRUE_ID, Codec, Cursor, Deserializable, Field, Kind, Object, Registry, SCHEMA, Serializable,
    TypeDescriptor, Value, functions, types,
};

static IMPOSTOR: TypeDescriptor = TypeDescriptor {
    id: 0x59511722,
    name: "impostor",
    ty: "Peer",
    kind: Kind::Constructor,
    flags: false,
    fields: &[Field::required("id", Codec::Int)],
};

static SHADOW_BOOL: TypeDescriptor = TypeDescriptor {
    id: BOOL_TRUE_ID,
    name: "shadowBool",
    ty: "Bool",
    kind: Kind::Constructor,
    flags: false,
    fields: &[],
};

fn peer_user(id: i64) -> Object {
    Object::builder(&types::PEER_USER).set("user_id", id).build().unwrap()
}

#[test]
fn registration_is_idempotent() {
    let mut registry = Registry::new();
    registry.register(&types::PEER_USER).unwrap();
    registry.register(&types::PEER_USER).unwrap();
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.resolve(0x59511722).unwrap().name, "peerUser");
}

#[test]
fn lookups_on_a_fresh_registry() {
    let mut registry = Registry::new();
    assert!(registry.is_empty());
    assert_eq!(registry.get(types::PEER_USER.id), None);

    registry.register(&types::PEER_USER).unwrap();
    assert!(!registry.is_empty());
    assert_eq!(registry.get(types::PEER_USER.id), Some(&types::PEER_USER));
    assert!(registry.contains(types::PEER_USER.id));
    assert!(!registry.contains(BOOL_TRUE_ID));
}

#[test]
fn conflicting_registration_fails() {
    let mut registry = Registry::new();
    registry.register(&types::PEER_USER).unwrap();
    assert_eq!(
        registry.register(&IMPOSTOR),
        Err(ConflictError { id: 0x59511722, existing: "peerUser", new: "impostor" })
    );
    assert_eq!(registry.resolve(0x59511722).unwrap(), &types::PEER_USER);
}

#[test]
fn reserved_ids_cannot_be_registered() {
    let err = Registry::new().register(&SHADOW_BOOL).unwrap_err();
    assert_eq!(err.existing, "boolTrue");
}

#[test]
fn unknown_ids() {
    let registry = Registry::new();
    let err = registry.resolve(0x12345678).unwrap_err();
    assert_eq!(err, Error::UnknownConstructor { id: 0x12345678 });
    assert!(err.is_schema_mismatch());
}

#[test]
fn unknown_id_stops_after_the_id() {
    let mut bytes = 0x0badf00du32.to_bytes();
    bytes.extend([0xff; 12]);

    let registry = Registry::with_schema().unwrap();
    let mut cursor = Cursor::from_slice(&bytes);
    assert_eq!(registry.read(&mut cursor), Err(Error::UnknownConstructor { id: 0x0badf00d }));
    assert_eq!(cursor.pos(), 4);
    assert_eq!(cursor.remaining(), 12);
}

#[test]
fn bundled_schema_loads_cleanly() {
    let registry = Registry::with_schema().unwrap();
    assert_eq!(registry.len(), SCHEMA.len());
    assert!(registry.contains(types::GEO_POINT.id));
    assert!(registry.contains(types::auth::SENT_CODE.id));
    assert!(registry.contains(types::MSG_CONTAINER.id));
}

#[cfg(not(feature = "deserializable-functions"))]
#[test]
fn functions_are_not_registered_by_default() {
    assert!(!Registry::with_schema().unwrap().contains(functions::PING.id));
}

#[cfg(feature = "deserializable-functions")]
#[test]
fn functions_can_be_registered() {
    assert!(Registry::with_schema().unwrap().contains(functions::PING.id));
}

#[test]
fn generic_round_trip() {
    let obj = peer_user(777);
    let mut bytes = Vec::new();
    tlwire::generic_write(&obj, &mut bytes);
    assert_eq!(&bytes[..4], &0x59511722u32.to_le_bytes());
    assert_eq!(bytes.len(), 12);

    let mut cursor = Cursor::from_slice(&bytes);
    let value = tlwire::generic_read(&mut cursor).unwrap();
    assert_eq!(value, Value::from(obj));
    assert_eq!(cursor.remaining(), 0);
}

#[test]
fn generic_read_accepts_bools() {
    let mut cursor = Cursor::from_slice(&[0x37, 0x97, 0x79, 0xbc]);
    assert_eq!(tlwire::generic_read(&mut cursor).unwrap(), Value::Bool(false));
    assert_eq!(Value::from_bytes(&true.to_bytes()).unwrap(), Value::Bool(true));
}

#[test]
fn read_object_rejects_bools() {
    let registry = Registry::with_schema().unwrap();
    let mut cursor = Cursor::from_slice(&[0xb5, 0x75, 0x72, 0x99]);
    assert_eq!(registry.read_object(&mut cursor), Err(Error::UnknownConstructor { id: BOOL_TRUE_ID }));
}

#[test]
fn typed_objects_use_the_global_registry() {
    let peers = vec![peer_user(1), peer_user(2)];
    let bytes = peers.to_bytes();
    assert_eq!(Vec::<Object>::from_bytes(&bytes).unwrap(), peers);
}

#[test]
fn decode_rejects_trailing_bytes() {
    let mut bytes = peer_user(5).to_bytes();
    bytes.push(0);
    assert_eq!(
        registry::global().decode(&bytes),
        Err(Error::InvalidLength(LengthError::Trailing(1)))
    );
}

#[test]
fn install_after_first_use_hands_the_registry_back() {
    let _ = registry::global();
    let custom = Registry::new();
    assert!(registry::install(custom).is_err());
}

#[test]
fn names_for_diagnostics() {
    let registry = Registry::with_schema().unwrap();
    assert_eq!(registry.name_for_id(types::PONG.id), Some("pong"));
    assert_eq!(registry.name_for_id(BOOL_TRUE_ID), Some("boolTrue"));
    assert_eq!(registry.name_for_id(1), None);
}

#[cfg(feature = "name-for-id")]
#[test]
fn generated_name_lookup_covers_functions() {
    assert_eq!(tlwire::name_for_id(0x7abe77ec), Some("ping"));
    assert_eq!(tlwire::name_for_id(0xa677244f), Some("auth.sendCode"));
}
