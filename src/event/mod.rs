/// 市值前段班的 24 小時漲幅排行
pub mod top_gainers;
