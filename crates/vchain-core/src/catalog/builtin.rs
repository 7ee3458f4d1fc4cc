use crate::types::{
    Layer, LayerKind, NodeId, PacketSpawn, Player, Position, StepKind, TimelineStep,
};

#[allow(clippy::too_many_arguments)]
fn layer(
    id: &str,
    kind: LayerKind,
    layer_num: u8,
    subtitle: &str,
    label: &str,
    description: &str,
    economics: [&str; 4],
    icon: &str,
    (x, y): (f64, f64),
    connections: &[&str],
    color: &str,
) -> Layer {
    let [margin, defense, access, verdict] = economics;
    Layer {
        id: NodeId::new(id),
        kind,
        layer_num,
        subtitle: subtitle.to_string(),
        label: label.to_string(),
        description: description.to_string(),
        margin: margin.to_string(),
        defense: defense.to_string(),
        access: access.to_string(),
        verdict: verdict.to_string(),
        main_players: Vec::new(),
        dos: Vec::new(),
        donts: Vec::new(),
        icon: icon.to_string(),
        position: Position { x, y },
        connections: connections.iter().map(|c| NodeId::new(*c)).collect(),
        color: color.to_string(),
    }
}

fn with_player(mut layer: Layer, title: &str, desc: &str) -> Layer {
    layer.main_players.push(Player {
        title: title.to_string(),
        desc: desc.to_string(),
    });
    layer
}

fn spawn(from: &str, to: &str, label: &str) -> PacketSpawn {
    PacketSpawn {
        from: NodeId::new(from),
        to: NodeId::new(to),
        label: label.to_string(),
    }
}

fn step(
    kind: StepKind,
    description: &str,
    active_nodes: &[&str],
    packets: Vec<PacketSpawn>,
    duration_ms: u64,
    details: &str,
) -> TimelineStep {
    TimelineStep {
        kind,
        active_nodes: active_nodes.iter().map(|n| NodeId::new(*n)).collect(),
        packets,
        duration_ms,
        description: description.to_string(),
        details: Some(details.to_string()),
    }
}

pub(crate) fn layers() -> Vec<Layer> {
    vec![
        // Infrastructure
        with_player(
            layer(
                "layer1",
                LayerKind::Foundation,
                1,
                "FOUNDATION",
                "Chips & Hardware",
                "A base física (Silício). Margens altíssimas, monopólios globais.",
                ["60-70%", "Altíssima", "Fechado", "Fechada"],
                "Cpu",
                (500.0, 700.0),
                &["layer2"],
                "#94a3b8",
            ),
            "NVIDIA",
            "H100 GPUs",
        ),
        with_player(
            layer(
                "layer2",
                LayerKind::Compute,
                2,
                "COMPUTE",
                "Cloud Infra",
                "Datacenters massivos que hospedam o hardware.",
                ["30-40%", "Alta", "Oligopólio", "Oligopólio"],
                "Server",
                (300.0, 600.0),
                &["layer3"],
                "#6366f1",
            ),
            "AWS",
            "EC2 P5",
        ),
        // Intelligence
        with_player(
            layer(
                "layer3",
                LayerKind::Intelligence,
                3,
                "INTELLIGENCE",
                "LLM Brain",
                "O cérebro probabilístico (GPT/Claude).",
                ["Em queda", "Média", "API", "Commodity"],
                "Brain",
                (500.0, 500.0),
                &["sub_summary"],
                "#d946ef",
            ),
            "GPT-4",
            "OpenAI",
        ),
        // Orchestration cluster
        layer(
            "sub_router",
            LayerKind::Connection,
            4,
            "ROUTER",
            "Orchestrator",
            "O porteiro. Decide para qual máquina enviar a tarefa.",
            ["N/A", "Alta", "Dev", "SWEET SPOT"],
            "Network",
            (680.0, 400.0),
            &["sub_rag", "layer3"],
            "#10b981",
        ),
        layer(
            "sub_rag",
            LayerKind::Connection,
            4,
            "MEMORY",
            "RAG Machine",
            "Busca dados proprietários (PDFs, BDs) para contextualizar.",
            ["N/A", "Dados", "Dev", "SWEET SPOT"],
            "Database",
            (780.0, 320.0),
            &["layer3"],
            "#059669",
        ),
        layer(
            "sub_summary",
            LayerKind::Connection,
            4,
            "OUTPUT",
            "Refiner",
            "Valida, formata e garante a segurança da resposta.",
            ["N/A", "UX", "Dev", "SWEET SPOT"],
            "Activity",
            (350.0, 400.0),
            &["layer5"],
            "#34d399",
        ),
        // Surface & agents
        layer(
            "layer5",
            LayerKind::Specialization,
            5,
            "AGENTS",
            "Agentes Verticais",
            "Especialistas funcionais (Advogado IA, Médico IA, Coder IA).",
            ["40-60%", "Alta", "SaaS", "SWEET SPOT"],
            "Bot",
            (550.0, 220.0),
            &["sub_router"],
            "#06b6d4",
        ),
        layer(
            "layer6",
            LayerKind::Surface,
            6,
            "INTERFACE",
            "Surface UI",
            "O ponto de contato com o humano.",
            ["10-20%", "Baixa", "Web", "Cemitério"],
            "Layout",
            (500.0, 80.0),
            &["layer5"],
            "#ef4444",
        ),
    ]
}

pub(crate) fn timeline() -> Vec<TimelineStep> {
    use StepKind::*;

    vec![
        // The entry beam stands in for a packet here
        step(
            Transfer,
            "1. INPUT DETECTADO",
            &["layer6"],
            vec![],
            1500,
            "O usuário enviou um comando. O sistema dispara um feixe ótico para a camada de Superfície.",
        ),
        step(
            Transfer,
            "2. UI -> AGENTES",
            &["layer6", "layer5"],
            vec![spawn("layer6", "layer5", "Raw Prompt")],
            1500,
            "A interface converte o clique em JSON e envia para a camada de Agentes Verticais.",
        ),
        step(
            AgentSelection,
            "3. SELEÇÃO DE ESPECIALISTA",
            &["layer5"],
            vec![],
            3500,
            "O sistema analisa a intenção e escolhe o melhor Agente Especialista (ex: Jurídico, Criativo ou Analítico) para a tarefa.",
        ),
        step(
            Transfer,
            "4. AGENTE -> ORQUESTRADOR",
            &["layer5", "sub_router"],
            vec![spawn("layer5", "sub_router", "Plan")],
            1500,
            "O Agente escolhido cria um plano de execução e o envia para o Orquestrador Central.",
        ),
        step(
            Processing,
            "5. MÁQUINA DE MEMÓRIA (RAG)",
            &["sub_router", "sub_rag"],
            vec![spawn("sub_router", "sub_rag", "Query")],
            2500,
            "A 'Máquina de Contexto' é ativada. Ela busca dados proprietários da empresa para enriquecer o prompt.",
        ),
        step(
            Processing,
            "6. EMPACOTAMENTO -> LLM",
            &["sub_rag", "layer3"],
            vec![spawn("sub_rag", "layer3", "Context + Prompt")],
            2000,
            "O Orquestrador empacota o Prompt do usuário + Dados do RAG e despacha para o Cérebro (LLM).",
        ),
        step(
            Processing,
            "7. INFERÊNCIA PROFUNDA",
            &["layer3", "layer2", "layer1"],
            vec![
                spawn("layer3", "layer2", "Tensors"),
                spawn("layer2", "layer1", "Ops"),
            ],
            2000,
            "Milhões de parâmetros são ativados no hardware físico. Calor é gerado. Inteligência emerge.",
        ),
        step(
            Transfer,
            "8. REFINAMENTO & SEGURANÇA",
            &["layer3", "sub_summary"],
            vec![spawn("layer3", "sub_summary", "Raw Text")],
            2000,
            "A resposta bruta passa pela máquina de Sumarização e Filtros de Segurança.",
        ),
        step(
            Transfer,
            "9. ENTREGA FINAL",
            &["sub_summary", "layer6"],
            vec![spawn("sub_summary", "layer6", "Final UX")],
            1500,
            "O ciclo se fecha. O valor é entregue ao usuário na superfície.",
        ),
    ]
}
