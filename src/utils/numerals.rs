/// 1 开始的序号转小写罗马数字（1→i, 4→iv, 16→xvi, 20→xx）
pub fn to_roman(n: u32) -> String {
    const MAP: [(u32, &str); 9] = [
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    let mut out = String::new();
    let mut v = n;
    for (value, symbol) in MAP {
        while v >= value {
            out.push_str(symbol);
            v -= value;
        }
    }
    out
}
