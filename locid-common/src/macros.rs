/// Tag the current call site and return its [`LocationId`](crate::LocationId)
///
/// Each expansion emits one [`LocationRecord`](crate::LocationRecord) into the
/// `loc_ids` link section. The function field defaults to the enclosing
/// `module_path!()`; pass a string literal to record a function name instead.
///
/// ```
/// use locid_common::loc;
///
/// let (id, line) = (loc!("parse_header"), line!());
/// let location = id.resolve();
/// assert_eq!(location.function, "parse_header");
/// assert_eq!(location.line, line);
/// ```
#[macro_export]
macro_rules! loc {
    (@emit $function:expr) => {{
        #[cfg_attr(target_vendor = "apple", link_section = "__DATA,loc_ids")]
        #[cfg_attr(not(target_vendor = "apple"), link_section = "loc_ids")]
        static RECORD: $crate::LocationRecord =
            $crate::LocationRecord::new($function, concat!(file!(), "\0"), line!());
        $crate::LocationId::of(&RECORD)
    }};
    () => {
        $crate::loc!(@emit concat!(module_path!(), "\0"))
    };
    ($function:literal) => {
        $crate::loc!(@emit concat!($function, "\0"))
    };
}
