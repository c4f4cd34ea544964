macro_rules! builder_set {
    ($attr_name: ident, $attr_type: ty) => {
        pub fn $attr_name(mut self, $attr_name: $attr_type) -> Self {
            self.$attr_name = Some($attr_name);
            self
        }
    }
}

pub fn unwrap_mandatory<V>(value: Option<V>, name: &'static str) -> crate::Result<V> {
    value.ok_or(crate::Error::MissingField(name))
}
