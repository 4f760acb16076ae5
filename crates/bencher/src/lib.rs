use serde::Serialize;

/// A payload shaped like a typical JSON api response.
#[derive(Debug, Clone, Serialize)]
pub struct HelloWorld {
    content: String,
    size: u32,
    price: f32,
    vip: bool,
}

impl HelloWorld {
    pub fn new(lines: usize) -> Self {
        let content = vec!["花褪残红青杏小。燕子飞时，绿水人家绕。枝上柳绵吹又少，天涯何处无芳草！"; lines].join("\n");
        Self { content, size: 100, price: 10.12, vip: true }
    }
}

#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    lines: usize,
}

impl TestCase {
    pub fn new(name: &'static str, lines: usize) -> Self {
        Self { name, lines }
    }

    pub fn small(name: &'static str) -> Self {
        Self::new(name, 1)
    }

    pub fn normal(name: &'static str) -> Self {
        Self::new(name, 100)
    }

    pub fn large(name: &'static str) -> Self {
        Self::new(name, 10_000)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn payload(&self) -> HelloWorld {
        HelloWorld::new(self.lines)
    }
}
